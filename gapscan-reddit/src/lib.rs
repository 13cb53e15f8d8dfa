//! Structured field extraction for Reddit post pages, plus the spreadsheet
//! enrichment pipeline that drives it.
//!
//! The extractor is deliberately best-effort: a structured marker element is
//! preferred, a regex pass recovers what the marker misses, and every
//! failure is represented as a field-level sentinel rather than an error
//! that would abort sibling rows.
pub mod extract;
pub mod sheet;
pub mod time;
pub mod types;
