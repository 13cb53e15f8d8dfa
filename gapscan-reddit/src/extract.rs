//! Layered field extraction from post-detail pages.
//!
//! Strategy order:
//! 1. read attributes off the `shreddit-post` marker element;
//! 2. if the marker is missing or left the title unresolved, recover
//!    title/comment-count/score with regexes over the raw markup, never
//!    overwriting a field the marker already resolved;
//! 3. archived/locked detection runs independently of both.

use chrono::{NaiveDateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};

use crate::time::{canonical_timestamp, normalize_timestamp, time_ago};
use crate::types::{FieldValue, PostStatus, RedditPostRecord};

/// Status banners live in this span; the class list is the designated
/// status region on current post pages.
const STATUS_REGION_SELECTOR: &str = "span.flex.flex-auto.flex-col.justify-center.text-14.pl-sm";

/// Extract all fields from a fetched post page, relative to the current time.
pub fn extract_post_details(html: &str) -> RedditPostRecord {
    extract_post_details_at(html, Utc::now().naive_utc())
}

/// As [`extract_post_details`], with an explicit "now" for deterministic
/// relative-age labels.
pub fn extract_post_details_at(html: &str, now: NaiveDateTime) -> RedditPostRecord {
    let mut record = RedditPostRecord::unresolved();
    let doc = Html::parse_document(html);

    if let Ok(marker) = Selector::parse("shreddit-post") {
        if let Some(post) = doc.select(&marker).next() {
            let el = post.value();
            if let Some(title) = el.attr("post-title") {
                record.title = FieldValue::Found(title.to_string());
            }
            if let Some(ts) = el.attr("created-timestamp") {
                apply_timestamp(&mut record, ts, now);
            }
            if let Some(count) = el.attr("comment-count") {
                record.comment_count = FieldValue::Found(count.to_string());
            }
            if let Some(score) = el.attr("score") {
                record.score = FieldValue::Found(score.to_string());
            }
        }
    }

    if !record.title.is_resolved() {
        apply_regex_fallback(&mut record, html);
    }

    if detect_archived_or_locked(&doc, html) {
        record.status = PostStatus::ArchivedOrLocked;
    }

    record
}

fn apply_timestamp(record: &mut RedditPostRecord, raw: &str, now: NaiveDateTime) {
    match normalize_timestamp(raw) {
        Some(dt) => {
            record.posted_time = FieldValue::Found(canonical_timestamp(dt));
            record.time_ago = FieldValue::Found(time_ago(dt, now));
        }
        None => {
            record.posted_time = FieldValue::ParseError;
            record.time_ago = FieldValue::ParseError;
        }
    }
}

/// Pattern-based recovery for markup where the marker element is absent.
/// Fields already resolved by the primary strategy are left untouched.
fn apply_regex_fallback(record: &mut RedditPostRecord, html: &str) {
    let fields: [(&str, &mut FieldValue); 3] = [
        (r#"post-title="([^"]*)""#, &mut record.title),
        (r#"comment-count="([^"]*)""#, &mut record.comment_count),
        (r#"score="([^"]*)""#, &mut record.score),
    ];

    for (pattern, slot) in fields {
        if slot.is_resolved() {
            continue;
        }
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        if let Some(value) = re.captures(html).and_then(|c| c.get(1)) {
            *slot = FieldValue::Found(value.as_str().to_string());
        }
    }
}

/// True-positive-biased archived/locked check: the designated status region
/// naming either state, a literal "Archived post." anywhere, or any
/// case-insensitive "locked" substring all count.
fn detect_archived_or_locked(doc: &Html, html: &str) -> bool {
    if let Ok(region) = Selector::parse(STATUS_REGION_SELECTOR) {
        for span in doc.select(&region) {
            let text = span.text().collect::<String>().to_lowercase();
            if text.contains("archived post") || text.contains("locked post") {
                return true;
            }
        }
    }

    if html.contains("Archived post.") {
        return true;
    }
    html.to_lowercase().contains("locked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 365 days after the marker page's created-timestamp (2024 is a leap
    // year, so the same calendar date would be 366 days out).
    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 2)
            .unwrap()
            .and_hms_opt(19, 3, 52)
            .unwrap()
    }

    const MARKER_PAGE: &str = r#"<html><body>
        <shreddit-post post-title="Rust vs Go in 2024"
            created-timestamp="2023-10-03T19:03:52.606000+0000"
            comment-count="128" score="1543" permalink="/r/rust/1">
        </shreddit-post>
        </body></html>"#;

    #[test]
    fn primary_strategy_reads_marker_attributes() {
        let rec = extract_post_details_at(MARKER_PAGE, fixed_now());
        assert_eq!(rec.title, FieldValue::Found("Rust vs Go in 2024".into()));
        assert_eq!(rec.posted_time, FieldValue::Found("2023-10-03 19:03:52".into()));
        assert_eq!(rec.time_ago, FieldValue::Found("1 yr. ago".into()));
        assert_eq!(rec.comment_count, FieldValue::Found("128".into()));
        assert_eq!(rec.score, FieldValue::Found("1543".into()));
        assert_eq!(rec.status, PostStatus::Active);
    }

    #[test]
    fn fallback_recovers_regex_visible_attributes() {
        let html = r#"<html><body>
            <faceplate-tracker post-title="Fallback title" comment-count="7" score="42">
            </faceplate-tracker></body></html>"#;
        let rec = extract_post_details_at(html, fixed_now());
        assert_eq!(rec.title, FieldValue::Found("Fallback title".into()));
        assert_eq!(rec.comment_count, FieldValue::Found("7".into()));
        assert_eq!(rec.score, FieldValue::Found("42".into()));
        // Nothing resolved the timestamp on this page.
        assert_eq!(rec.posted_time, FieldValue::NotFound);
    }

    #[test]
    fn fallback_never_overwrites_primary_fields() {
        let html = r#"<html><body>
            <shreddit-post created-timestamp="1696359832" comment-count="3"></shreddit-post>
            <div post-title="From fallback" score="999" comment-count="888"></div>
            </body></html>"#;
        let rec = extract_post_details_at(html, fixed_now());
        // Title was unresolved by the marker, so the fallback fills it in,
        // but the marker-resolved comment count stays.
        assert_eq!(rec.title, FieldValue::Found("From fallback".into()));
        assert_eq!(rec.comment_count, FieldValue::Found("3".into()));
        assert_eq!(rec.score, FieldValue::Found("999".into()));
    }

    #[test]
    fn bad_timestamp_localizes_to_the_two_time_fields() {
        let html = r#"<shreddit-post post-title="T" created-timestamp="not-a-date"
            comment-count="1" score="2"></shreddit-post>"#;
        let rec = extract_post_details_at(html, fixed_now());
        assert_eq!(rec.posted_time, FieldValue::ParseError);
        assert_eq!(rec.time_ago, FieldValue::ParseError);
        assert_eq!(rec.title, FieldValue::Found("T".into()));
        assert_eq!(rec.score, FieldValue::Found("2".into()));
    }

    #[test]
    fn status_region_marks_archived() {
        let html = r#"<html><body><shreddit-post post-title="T"></shreddit-post>
            <span class="flex flex-auto flex-col justify-center text-14 pl-sm">
            Archived post. New comments cannot be posted.</span></body></html>"#;
        let rec = extract_post_details_at(html, fixed_now());
        assert_eq!(rec.status, PostStatus::ArchivedOrLocked);
    }

    #[test]
    fn locked_substring_anywhere_marks_archived() {
        let html = r#"<shreddit-post post-title="T"></shreddit-post>
            <icon-lock title="Post is LOCKED"></icon-lock>"#;
        let rec = extract_post_details_at(html, fixed_now());
        assert_eq!(rec.status, PostStatus::ArchivedOrLocked);
    }

    #[test]
    fn missing_everything_yields_not_found_not_error() {
        let rec = extract_post_details_at("<html><body><p>hi</p></body></html>", fixed_now());
        assert_eq!(rec.title, FieldValue::NotFound);
        assert_eq!(rec.comment_count, FieldValue::NotFound);
        assert_eq!(rec.score, FieldValue::NotFound);
        assert_eq!(rec.status, PostStatus::Active);
    }
}
