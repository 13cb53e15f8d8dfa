//! Resilient model calls: extract-then-parse with bounded retry.
//!
//! One shared implementation serves every call site that expects a JSON
//! payload back from the model (fan-out and batch analysis both), rather
//! than re-deriving the retry/parse logic per prompt.

use gapscan_llm::json::extract_json_object;
use gapscan_llm::traits::{GenerateOptions, LlmClient, LlmError};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Why a call ultimately produced no usable structure.
#[derive(thiserror::Error, Debug)]
pub enum CallFailure {
    /// Every attempt produced text we could not extract-and-parse. The last
    /// raw response is retained for operator inspection.
    #[error("model output stayed malformed after {attempts} attempts")]
    Malformed { attempts: usize, last_raw: String },

    /// The model call itself failed (transport, auth, rate limit). Not
    /// retried: surfaced immediately as its own failure kind.
    #[error("model call failed: {0}")]
    Transport(#[from] LlmError),
}

/// Wraps a model client with strict-JSON extraction and bounded
/// retry-with-backoff. Attempt N waits N times the base backoff before
/// retrying, so delays increase linearly.
pub struct ResilientCaller {
    llm: Arc<dyn LlmClient>,
    max_attempts: usize,
    backoff: Duration,
}

impl ResilientCaller {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Prompt the model and parse the first balanced JSON object in its
    /// response as a `T`. Never panics and never raises past this
    /// boundary: the caller receives either the value or a [`CallFailure`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        prompt: &str,
        opts: GenerateOptions,
    ) -> Result<T, CallFailure> {
        let mut last_raw = String::new();

        for attempt in 1..=self.max_attempts {
            let response = self.llm.generate(prompt, opts).await?;

            match parse_payload::<T>(&response.text) {
                Ok(value) => {
                    tracing::debug!(attempt, "model returned parseable payload");
                    return Ok(value);
                }
                Err(reason) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        %reason,
                        raw_chars = response.text.len(),
                        "malformed model output"
                    );
                    last_raw = response.text;
                }
            }

            if attempt < self.max_attempts {
                sleep(self.backoff * attempt as u32).await;
            }
        }

        Err(CallFailure::Malformed {
            attempts: self.max_attempts,
            last_raw,
        })
    }
}

fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let span = extract_json_object(raw).ok_or_else(|| "no balanced JSON object".to_string())?;
    serde_json::from_str(span).map_err(|e| e.to_string())
}
