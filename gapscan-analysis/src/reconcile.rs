//! Merging per-batch analysis output into one ordered, gap-free report.

use crate::types::{BatchAnalysis, QueryAnalysis, UrlBreakdown, WorkItem};
use serde::Serialize;
use std::collections::HashMap;

/// One row per scored work item: the best-covering document plus the full
/// per-document breakdown retained for detail views.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledRow {
    pub query: String,
    pub kind: Option<String>,
    pub search_intent: Option<String>,
    pub best_url: String,
    pub best_score: u8,
    pub gap_description: String,
    pub optimization_suggestion: String,
    pub breakdown: HashMap<String, UrlBreakdown>,
}

/// Reconciliation output. Every work item lands in exactly one of the two
/// lists, both of which preserve original generation order.
#[derive(Debug, Default, Serialize)]
pub struct Reconciled {
    pub rows: Vec<ReconciledRow>,
    pub skipped: Vec<String>,
}

/// Merge batch outcomes (`None` = batch failed after all retries) into
/// ordered rows plus an ordered skipped list. Work items whose batch
/// failed, or whose breakdown came back absent or empty, are reported as
/// skipped rather than silently dropped.
pub fn reconcile(
    batches: &[&[WorkItem]],
    outcomes: &[Option<BatchAnalysis>],
    doc_order: &[String],
) -> Reconciled {
    debug_assert_eq!(batches.len(), outcomes.len());

    let mut result = Reconciled::default();

    for (batch, outcome) in batches.iter().zip(outcomes) {
        let Some(analysis) = outcome else {
            result
                .skipped
                .extend(batch.iter().map(|item| item.query.clone()));
            continue;
        };

        let by_key: HashMap<String, &QueryAnalysis> = analysis
            .batch_analysis
            .iter()
            .map(|qa| {
                let key = qa.query.trim().to_lowercase();
                (key, qa)
            })
            .collect();

        for item in *batch {
            let Some(qa) = by_key.get(&item.match_key()) else {
                tracing::warn!(query = %item.query, "query missing from batch response");
                result.skipped.push(item.query.clone());
                continue;
            };
            let Some((best_url, best)) = best_document(&qa.analysis_per_url, doc_order) else {
                tracing::warn!(query = %item.query, "empty breakdown in batch response");
                result.skipped.push(item.query.clone());
                continue;
            };

            result.rows.push(ReconciledRow {
                query: item.query.clone(),
                kind: item.kind.clone(),
                search_intent: item.search_intent.clone(),
                best_url: best_url.to_string(),
                best_score: best.coverage_score,
                gap_description: best.gap_description.clone(),
                optimization_suggestion: best.optimization_suggestion.clone(),
                breakdown: qa.analysis_per_url.clone(),
            });
        }
    }

    result
}

/// Best-covering document: strictly highest score wins; on a tie, the
/// first document in original input order wins. Documents the model
/// invented (keys outside `doc_order`) are considered last, in sorted
/// order, so selection stays deterministic.
fn best_document<'a>(
    breakdown: &'a HashMap<String, UrlBreakdown>,
    doc_order: &'a [String],
) -> Option<(&'a str, &'a UrlBreakdown)> {
    let mut candidates: Vec<&str> = doc_order
        .iter()
        .map(String::as_str)
        .filter(|url| breakdown.contains_key(*url))
        .collect();

    let mut extras: Vec<&str> = breakdown
        .keys()
        .map(String::as_str)
        .filter(|key| !doc_order.iter().any(|d| d == key))
        .collect();
    extras.sort_unstable();
    candidates.extend(extras);

    let mut best: Option<(&str, &UrlBreakdown)> = None;
    for url in candidates {
        let entry = breakdown.get(url)?;
        let better = match best {
            None => true,
            Some((_, current)) => entry.coverage_score > current.coverage_score,
        };
        if better {
            best = Some((url, entry));
        }
    }
    best
}
