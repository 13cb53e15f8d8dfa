//! Typed wire formats for everything the model returns.
//!
//! The generator is untrusted: fields may be missing, empty, or out of
//! range. Defaulting and coercion happen here, at the boundary, so the
//! rest of the pipeline never touches a loose JSON blob.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One atomic research question generated for a topic. Immutable once
/// generated; order within the originating list is significant and is
/// preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub query: String,
    /// Tag such as `question_based` or `long_tail`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// informational / transactional / navigational.
    #[serde(default)]
    pub search_intent: Option<String>,
    #[serde(default)]
    pub gap_potential: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl WorkItem {
    /// Matching key: model output echoes queries back with incidental
    /// whitespace and casing drift.
    pub fn match_key(&self) -> String {
        self.query.trim().to_lowercase()
    }
}

/// Sizing metadata the fan-out prompt asks the model to explain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanoutDetails {
    #[serde(default)]
    pub target_query_count: Option<u32>,
    #[serde(default)]
    pub reasoning_for_count: Option<String>,
    #[serde(default)]
    pub analysis_focus: Option<String>,
}

/// Full fan-out payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanoutResponse {
    #[serde(default)]
    pub analysis_details: FanoutDetails,
    #[serde(default)]
    pub content_gap_queries: Vec<WorkItem>,
}

/// How one document covers one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlBreakdown {
    /// Always an integer in [0, 10]: missing values default to 0 and
    /// out-of-range values are clamped, so downstream max/aggregation
    /// never fails on absence.
    #[serde(default, deserialize_with = "clamped_score")]
    pub coverage_score: u8,
    #[serde(default)]
    pub gap_description: String,
    #[serde(default)]
    pub optimization_suggestion: String,
}

fn clamped_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, 10) as u8)
}

/// Per-query slice of one batch response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryAnalysis {
    #[serde(default)]
    pub query: String,
    /// Keyed by source-document URL. Tolerated when absent or empty; the
    /// reconciler then treats the query as skipped rather than crashing.
    #[serde(default)]
    pub analysis_per_url: HashMap<String, UrlBreakdown>,
}

/// Cross-query observations the analysis prompt also asks for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallInsights {
    #[serde(default)]
    pub strongest_areas: Vec<String>,
    #[serde(default)]
    pub biggest_gaps: Vec<String>,
    #[serde(default)]
    pub quick_wins: Vec<String>,
}

/// One parsed batch response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchAnalysis {
    #[serde(default)]
    pub batch_analysis: Vec<QueryAnalysis>,
    #[serde(default)]
    pub overall_insights: Option<OverallInsights>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_item_tolerates_missing_optional_fields() {
        let item: WorkItem = serde_json::from_str(r#"{"query": "what is qke"}"#).unwrap();
        assert_eq!(item.query, "what is qke");
        assert_eq!(item.kind, None);
        assert_eq!(item.search_intent, None);
    }

    #[test]
    fn type_tag_maps_to_kind() {
        let item: WorkItem =
            serde_json::from_str(r#"{"query": "q", "type": "long_tail"}"#).unwrap();
        assert_eq!(item.kind.as_deref(), Some("long_tail"));
    }

    #[test]
    fn missing_score_defaults_to_zero() {
        let b: UrlBreakdown = serde_json::from_str(r#"{"gap_description": "thin"}"#).unwrap();
        assert_eq!(b.coverage_score, 0);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let high: UrlBreakdown = serde_json::from_str(r#"{"coverage_score": 14}"#).unwrap();
        assert_eq!(high.coverage_score, 10);
        let low: UrlBreakdown = serde_json::from_str(r#"{"coverage_score": -3}"#).unwrap();
        assert_eq!(low.coverage_score, 0);
    }

    #[test]
    fn batch_tolerates_missing_breakdown() {
        let parsed: BatchAnalysis =
            serde_json::from_str(r#"{"batch_analysis": [{"query": "q"}]}"#).unwrap();
        assert!(parsed.batch_analysis[0].analysis_per_url.is_empty());
        assert!(parsed.overall_insights.is_none());
    }
}
