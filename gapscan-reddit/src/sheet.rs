//! Spreadsheet enrichment: append extracted post fields to a CSV.
//!
//! The URL column is auto-detected by substring containment against a
//! domain marker, six derived columns are appended without mutating the
//! originals, and output rows keep input order exactly.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::extract::extract_post_details;
use crate::types::RedditPostRecord;
use gapscan_web::fetch::PageFetcher;

/// Derived columns, in the order they are appended.
pub const DERIVED_COLUMNS: [&str; 6] = [
    "Post Title",
    "Posted Date & Time",
    "Posted (Relative)",
    "Total Comments",
    "Total Upvotes",
    "Archived/Locked",
];

/// Default domain marker used for URL-column detection.
pub const DEFAULT_URL_MARKER: &str = "reddit.com";

/// Cell value for rows whose URL cell does not match the marker.
const NOT_PROCESSED: &str = "Not processed";

#[derive(thiserror::Error, Debug)]
pub enum SheetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("column {0:?} not present in input")]
    MissingColumn(String),

    #[error("no column contains the marker {0:?}")]
    NoUrlColumn(String),
}

/// Knobs for one enrichment run.
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Explicit URL column name; when `None` the first column containing
    /// the marker anywhere in its values is used.
    pub url_column: Option<String>,
    /// Domain marker for detection and per-row filtering.
    pub url_marker: String,
    /// Politeness delay between row fetches.
    pub row_delay: Duration,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            url_column: None,
            url_marker: DEFAULT_URL_MARKER.to_string(),
            row_delay: Duration::from_secs(1),
        }
    }
}

/// What an enrichment run did, for operator-facing summaries.
#[derive(Debug, Serialize)]
pub struct EnrichSummary {
    pub rows: usize,
    pub processed: usize,
    pub url_column: String,
}

/// First column whose values contain `marker` (case-insensitive), if any.
pub fn detect_url_column(
    headers: &StringRecord,
    rows: &[StringRecord],
    marker: &str,
) -> Option<usize> {
    let marker = marker.to_ascii_lowercase();
    (0..headers.len()).find(|&idx| {
        rows.iter()
            .any(|row| cell_matches(row.get(idx), &marker))
    })
}

fn cell_matches(cell: Option<&str>, marker_lower: &str) -> bool {
    cell.is_some_and(|v| v.to_ascii_lowercase().contains(marker_lower))
}

/// Read `input`, enrich matching rows, and write `output` with the six
/// derived columns appended. Per-row failures are contained as `Error`
/// cells and never abort the remaining rows.
pub async fn enrich_csv(
    fetcher: &PageFetcher,
    input: &Path,
    output: &Path,
    opts: &SheetOptions,
) -> Result<EnrichSummary, SheetError> {
    let mut reader = ReaderBuilder::new().from_path(input)?;
    let headers = reader.headers()?.clone();
    let rows: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let marker = opts.url_marker.to_ascii_lowercase();
    let url_idx = match &opts.url_column {
        Some(name) => headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SheetError::MissingColumn(name.clone()))?,
        None => detect_url_column(&headers, &rows, &marker)
            .ok_or_else(|| SheetError::NoUrlColumn(opts.url_marker.clone()))?,
    };
    let url_column = headers.get(url_idx).unwrap_or_default().to_string();
    tracing::info!(column = %url_column, rows = rows.len(), "enriching spreadsheet");

    let mut writer = WriterBuilder::new().from_path(output)?;
    let mut out_headers = headers.clone();
    for col in DERIVED_COLUMNS {
        out_headers.push_field(col);
    }
    writer.write_record(&out_headers)?;

    let total = rows.len();
    let mut processed = 0usize;

    for (i, row) in rows.iter().enumerate() {
        let cell = row.get(url_idx).unwrap_or_default();
        let record = if cell_matches(Some(cell), &marker) {
            processed += 1;
            let url = cell.trim();
            tracing::info!(row = i + 1, total, url, "scraping post");
            let record = match fetcher.fetch(url).await {
                Ok(html) => extract_post_details(&html),
                Err(err) => {
                    tracing::warn!(url, error = %err, "row fetch failed");
                    RedditPostRecord::fetch_failed()
                }
            };
            if !opts.row_delay.is_zero() && i + 1 < total {
                tokio::time::sleep(opts.row_delay).await;
            }
            Some(record)
        } else {
            None
        };

        let mut out = row.clone();
        match record {
            Some(record) => {
                for value in record.derived_fields() {
                    out.push_field(&value);
                }
            }
            None => {
                for _ in DERIVED_COLUMNS {
                    out.push_field(NOT_PROCESSED);
                }
            }
        }
        writer.write_record(&out)?;
    }

    writer.flush()?;
    Ok(EnrichSummary {
        rows: total,
        processed,
        url_column,
    })
}
