//! Common types shared across the Gapscan workspace.
//!
//! This crate defines the shared error type, result alias, and the
//! [`observability`] module used by every binary and integration test.
//! It is intentionally lightweight so that all crates can depend on it
//! without heavy transitive costs.
//!
//! # Overview
//!
//! - [`GapscanError`] and [`Result`]: shared error handling
//! - [`AnalysisMode`]: how aggressively the query fan-out step expands a topic
//! - [`ReportFormat`]: preferred encoding for exported reports
//! - [`observability`]: centralised tracing/logging initialisation
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// How aggressively the fan-out step expands a topic into research queries.
///
/// `Simple` asks the model for at least ten queries; `Deep` asks for at
/// least twenty and widens the angles it should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Simple,
    Deep,
}

impl AnalysisMode {
    /// Minimum number of queries the fan-out prompt demands for this mode.
    pub fn minimum_queries(self) -> usize {
        match self {
            AnalysisMode::Simple => 10,
            AnalysisMode::Deep => 20,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Simple => write!(f, "simple"),
            AnalysisMode::Deep => write!(f, "deep"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = GapscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(AnalysisMode::Simple),
            "deep" => Ok(AnalysisMode::Deep),
            other => Err(GapscanError::Config(format!(
                "unknown analysis mode: {other} (expected \"simple\" or \"deep\")"
            ))),
        }
    }
}

/// Preferred encoding for exported reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = GapscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(GapscanError::Config(format!(
                "unknown report format: {other} (expected \"json\" or \"csv\")"
            ))),
        }
    }
}

/// Error types used across the Gapscan workspace.
#[derive(thiserror::Error, Debug)]
pub enum GapscanError {
    /// Configuration was incomplete or invalid. The only run-fatal error
    /// class: everything else is contained at the item it affects.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model produced no usable output for a required step.
    #[error("Model error: {0}")]
    Llm(String),

    /// A report could not be rendered or written.
    #[error("Report error: {0}")]
    Report(String),

    /// Filesystem-level failure while reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper for lower-level failures that carry their own context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`GapscanError`].
pub type Result<T> = std::result::Result<T, GapscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_mode_round_trips_through_str() {
        assert_eq!("simple".parse::<AnalysisMode>().unwrap(), AnalysisMode::Simple);
        assert_eq!(" Deep ".parse::<AnalysisMode>().unwrap(), AnalysisMode::Deep);
        assert!("thorough".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn mode_minimums_match_fanout_contract() {
        assert_eq!(AnalysisMode::Simple.minimum_queries(), 10);
        assert_eq!(AnalysisMode::Deep.minimum_queries(), 20);
    }
}
