use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single completion from a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Failures from the model call itself.
///
/// Every variant here is transport-class and not worth retrying at the
/// batch level: malformed *content* is detected downstream by the JSON
/// extraction step, never here.
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model returned an empty completion")]
    EmptyCompletion,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Sampling knobs forwarded to the provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    /// Low-temperature options suited to schema-following prompts.
    pub fn deterministic() -> Self {
        Self {
            max_tokens: None,
            temperature: Some(0.2),
        }
    }
}

/// Provider-agnostic completion interface.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt.
    async fn generate(&self, prompt: &str, opts: GenerateOptions)
        -> Result<LlmResponse, LlmError>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
