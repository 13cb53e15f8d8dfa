//! Loader for workspace configuration with YAML + environment overlays.
//!
//! The schema for `gapscan.yaml` has four sections: `llm` (provider
//! credentials), `fetch` (page acquisition), `analysis` (batching and retry
//! knobs), and `reddit` (spreadsheet enrichment). `GAPSCAN_`-prefixed
//! environment variables override file values, and `${VAR}` placeholders in
//! string values are expanded recursively before deserialisation.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level configuration for a Gapscan run.
#[derive(Debug, Deserialize)]
pub struct GapscanConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub reddit: RedditSettings,
}

impl GapscanConfig {
    /// Precondition check performed once before any work begins: the
    /// analysis pipeline refuses to start without model credentials.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match &self.llm {
            LlmSettings::Gemini { api_key, .. } if !api_key.trim().is_empty() => Ok(api_key),
            LlmSettings::Gemini { .. } => Err(ConfigError::Message(
                "llm.api_key is empty; set it in gapscan.yaml or via GEMINI_API_KEY".to_string(),
            )),
        }
    }
}

/// Model provider credentials. The tag is `provider`.
#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmSettings {
    Gemini {
        #[serde(default = "default_gemini_key")]
        api_key: String,
        #[serde(default = "default_gemini_model")]
        model: String,
    },
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::Gemini {
            api_key: default_gemini_key(),
            model: default_gemini_model(),
        }
    }
}

// Fallback when neither the file nor GAPSCAN__* overrides name a key.
fn default_gemini_key() -> String {
    std::env::var("GEMINI_API_KEY").unwrap_or_default()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

/// Page acquisition knobs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-request budget in seconds for a single page fetch.
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self { timeout_secs: 12 }
    }
}

/// Batching and retry knobs for the analysis loop.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Queries per analysis call.
    pub batch_size: usize,
    /// Total model-call attempts per batch before it is reported skipped.
    pub max_attempts: usize,
    /// Base backoff in seconds; attempt N waits N times this.
    pub backoff_secs: u64,
    /// Pause between consecutive batches, respecting provider rate limits.
    pub batch_delay_secs: u64,
    /// Character budget for normalized page text handed to the model.
    pub content_budget: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_attempts: 3,
            backoff_secs: 2,
            batch_delay_secs: 1,
            content_budget: 5000,
        }
    }
}

/// Spreadsheet enrichment knobs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    /// Politeness delay in seconds between row fetches.
    pub row_delay_secs: u64,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self { row_delay_secs: 1 }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct GapscanConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GapscanConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GapscanConfigLoader {
    /// Start with sensible defaults: `GAPSCAN_` env overrides are always on.
    ///
    /// ```
    /// use gapscan_config::GapscanConfigLoader;
    ///
    /// let config = GapscanConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.analysis.batch_size, 10);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("GAPSCAN").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a config file that may be absent, so headless deployments can
    /// rely purely on environment variables and defaults.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests and the CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config, expanding `${VAR}` placeholders first.
    pub fn load(self) -> Result<GapscanConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
