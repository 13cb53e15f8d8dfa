use serde::Serialize;
use std::fmt;

/// Outcome of extracting one field from a post page.
///
/// `NotFound` means the fetch succeeded but the field was absent after all
/// fallback strategies; `Error` means the fetch itself failed; `ParseError`
/// is specific to timestamp fields and never spreads to other fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldValue {
    Found(String),
    NotFound,
    Error,
    ParseError,
}

impl FieldValue {
    pub fn is_resolved(&self) -> bool {
        matches!(self, FieldValue::Found(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Found(v) => write!(f, "{v}"),
            FieldValue::NotFound => write!(f, "Not found"),
            FieldValue::Error => write!(f, "Error"),
            FieldValue::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Whether the post still accepts interaction.
///
/// Archived and locked are deliberately conflated: the source markup does
/// not reliably distinguish them, so the ambiguity is kept explicit as one
/// tri-state instead of guessing a finer-grained intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PostStatus {
    Active,
    ArchivedOrLocked,
    Error,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Active => write!(f, "No"),
            PostStatus::ArchivedOrLocked => write!(f, "Yes"),
            PostStatus::Error => write!(f, "Error"),
        }
    }
}

/// Structured fields pulled from one post page. One record per URL; records
/// are never merged across rows.
#[derive(Debug, Clone, Serialize)]
pub struct RedditPostRecord {
    pub title: FieldValue,
    pub posted_time: FieldValue,
    pub time_ago: FieldValue,
    pub comment_count: FieldValue,
    pub score: FieldValue,
    pub status: PostStatus,
}

impl RedditPostRecord {
    /// Starting state before any strategy has run.
    pub fn unresolved() -> Self {
        Self {
            title: FieldValue::NotFound,
            posted_time: FieldValue::NotFound,
            time_ago: FieldValue::NotFound,
            comment_count: FieldValue::NotFound,
            score: FieldValue::NotFound,
            status: PostStatus::Active,
        }
    }

    /// Record for a URL whose HTML could not be fetched at all.
    pub fn fetch_failed() -> Self {
        Self {
            title: FieldValue::Error,
            posted_time: FieldValue::Error,
            time_ago: FieldValue::Error,
            comment_count: FieldValue::Error,
            score: FieldValue::Error,
            status: PostStatus::Error,
        }
    }

    /// Render the six derived spreadsheet cells, in output-column order.
    pub fn derived_fields(&self) -> [String; 6] {
        [
            self.title.to_string(),
            self.posted_time.to_string(),
            self.time_ago.to_string(),
            self.comment_count.to_string(),
            self.score.to_string(),
            self.status.to_string(),
        ]
    }
}
