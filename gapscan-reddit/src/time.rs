//! Timestamp normalization and relative-age labels.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a post timestamp into a naive UTC clock time.
///
/// Accepts ISO-8601-like strings with optional fractional seconds and an
/// offset written as `+00:00`, `+0000`, or a trailing `Z`, as well as Unix
/// epoch numbers (integer or fractional).
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains('T') {
        let cleaned = match raw.strip_suffix('Z') {
            Some(stripped) => format!("{stripped}+00:00"),
            None => raw.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_str(&cleaned, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(dt.naive_utc());
        }
        // Offset-free ISO form.
        return NaiveDateTime::parse_from_str(&cleaned, "%Y-%m-%dT%H:%M:%S%.f").ok();
    }

    let secs: f64 = raw.parse().ok()?;
    let whole = secs.trunc() as i64;
    let nanos = (secs.fract() * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(whole, nanos).map(|dt| dt.naive_utc())
}

/// Canonical `YYYY-MM-DD HH:MM:SS` rendering.
pub fn canonical_timestamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Relative-age label in the style posts display it.
///
/// First matching rule wins: whole years (rounded up), whole months
/// (rounded up), days, hours, minutes, and finally "now".
///
/// ```
/// use chrono::NaiveDate;
/// use gapscan_reddit::time::time_ago;
///
/// let t = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// assert_eq!(time_ago(t, t), "now");
/// assert_eq!(time_ago(t, t + chrono::Duration::days(1)), "1 day ago");
/// ```
pub fn time_ago(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let delta = now.signed_duration_since(then);
    let secs = delta.num_seconds().max(0);
    let days = delta.num_days().max(0);

    if days >= 365 {
        format!("{} yr. ago", (days + 364) / 365)
    } else if days >= 30 {
        format!("{} mo. ago", (days + 29) / 30)
    } else if days >= 1 {
        if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{days} days ago")
        }
    } else if secs >= 3600 {
        format!("{} hr. ago", secs / 3600)
    } else if secs >= 60 {
        format!("{} min. ago", secs / 60)
    } else {
        "now".to_string()
    }
}
