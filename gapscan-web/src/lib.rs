//! Page acquisition and text normalization.
//!
//! - [`fetch::PageFetcher`]: bounded-timeout HTTP fetch with typed errors
//! - [`normalize::clean_text`]: boilerplate-free plain text under a budget
//! - [`SourceDocument`]: one fetched-and-cleaned page, failure contained
pub mod fetch;
pub mod normalize;

use fetch::PageFetcher;
use serde::Serialize;

/// One source page after fetch and normalization.
///
/// A failed fetch is represented, never raised: `text` is empty and
/// `fetch_error` carries the reason, so sibling documents keep flowing.
#[derive(Debug, Clone, Serialize)]
pub struct SourceDocument {
    pub url: String,
    pub text: String,
    pub fetch_error: Option<String>,
}

impl SourceDocument {
    pub fn is_available(&self) -> bool {
        self.fetch_error.is_none()
    }
}

/// Fetch `url` and normalize its markup down to `budget` characters.
///
/// Fetch failures are folded into the returned [`SourceDocument`] so one
/// bad page never aborts the run.
pub async fn acquire_document(fetcher: &PageFetcher, url: &str, budget: usize) -> SourceDocument {
    match fetcher.fetch(url).await {
        Ok(html) => {
            let text = normalize::clean_text(&html, budget);
            tracing::info!(url, chars = text.len(), "fetched and normalized page");
            SourceDocument {
                url: url.to_string(),
                text,
                fetch_error: None,
            }
        }
        Err(err) => {
            tracing::warn!(url, error = %err, "page fetch failed");
            SourceDocument {
                url: url.to_string(),
                text: String::new(),
                fetch_error: Some(err.to_string()),
            }
        }
    }
}
