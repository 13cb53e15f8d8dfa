//! End-to-end orchestration of one analysis run.
//!
//! Strictly sequential: fan-out (or memo recall), per-document fetch and
//! normalize, batch planning, one resilient model call per batch with an
//! inter-batch delay, then reconciliation into a [`GapReport`]. The only
//! fatal failure is producing no queries at all; every later failure is
//! contained at the document or batch it hit.

use chrono::Utc;
use gapscan_common::{AnalysisMode, GapscanError, Result};
use gapscan_llm::traits::GenerateOptions;
use gapscan_web::fetch::PageFetcher;
use gapscan_web::{acquire_document, SourceDocument};
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use crate::caller::ResilientCaller;
use crate::memo::{fingerprint, InputMemo};
use crate::planner::plan_batches;
use crate::prompt::{analysis_prompt, fanout_prompt};
use crate::reconcile::reconcile;
use crate::report::{DocumentStatus, GapReport};
use crate::types::{BatchAnalysis, FanoutResponse, OverallInsights, WorkItem};

/// Run-level knobs, resolved from configuration by the binary.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub mode: AnalysisMode,
    pub batch_size: usize,
    pub content_budget: usize,
    pub batch_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Simple,
            batch_size: 10,
            content_budget: gapscan_web::normalize::DEFAULT_TEXT_BUDGET,
            batch_delay: Duration::from_secs(1),
        }
    }
}

pub struct GapPipeline {
    caller: ResilientCaller,
    fetcher: PageFetcher,
    settings: PipelineSettings,
}

impl GapPipeline {
    pub fn new(caller: ResilientCaller, fetcher: PageFetcher, settings: PipelineSettings) -> Self {
        Self {
            caller,
            fetcher,
            settings,
        }
    }

    /// Run one analysis. The memo is caller-owned state keyed on
    /// topic+mode: an unchanged pair reuses the previous query list
    /// instead of regenerating it.
    pub async fn run(
        &self,
        topic: &str,
        urls: &[String],
        memo: &mut InputMemo<Vec<WorkItem>>,
    ) -> Result<GapReport> {
        let queries = self.obtain_queries(topic, memo).await?;
        tracing::info!(topic, count = queries.len(), "query list ready");

        let mut documents = Vec::with_capacity(urls.len());
        for url in urls {
            documents.push(acquire_document(&self.fetcher, url, self.settings.content_budget).await);
        }
        let available = documents.iter().filter(|d| d.is_available()).count();
        tracing::info!(total = documents.len(), available, "documents acquired");

        let batches = plan_batches(&queries, self.settings.batch_size);
        let (outcomes, failed_batches, insights) =
            self.score_batches(&batches, &documents, available).await;

        let merged = reconcile(&batches, &outcomes, urls);

        Ok(GapReport {
            run_id: Uuid::new_v4(),
            topic: topic.to_string(),
            mode: self.settings.mode,
            generated_at: Utc::now(),
            queries,
            documents: documents
                .iter()
                .map(|doc| DocumentStatus {
                    url: doc.url.clone(),
                    chars: doc.text.chars().count(),
                    fetch_error: doc.fetch_error.clone(),
                })
                .collect(),
            rows: merged.rows,
            skipped: merged.skipped,
            failed_batches,
            insights,
        })
    }

    async fn obtain_queries(
        &self,
        topic: &str,
        memo: &mut InputMemo<Vec<WorkItem>>,
    ) -> Result<Vec<WorkItem>> {
        let key = fingerprint(&[topic, &self.settings.mode.to_string()]);
        if let Some(cached) = memo.get(&key) {
            tracing::info!(topic, count = cached.len(), "reusing memoized query list");
            return Ok(cached.clone());
        }

        let prompt = fanout_prompt(topic, self.settings.mode);
        let response: FanoutResponse = self
            .caller
            .request(&prompt, GenerateOptions::deterministic())
            .await
            .map_err(|e| GapscanError::Llm(format!("query generation failed: {e}")))?;

        if response.content_gap_queries.is_empty() {
            return Err(GapscanError::Llm(
                "query generation returned an empty list".to_string(),
            ));
        }
        if let Some(target) = response.analysis_details.target_query_count {
            tracing::debug!(target, actual = response.content_gap_queries.len(), "fan-out sizing");
        }

        memo.put(key, response.content_gap_queries.clone());
        Ok(response.content_gap_queries)
    }

    /// One model call per batch, in order, with the configured delay in
    /// between. A failed batch (malformed after retries, or transport)
    /// yields `None` and the run continues.
    async fn score_batches(
        &self,
        batches: &[&[WorkItem]],
        documents: &[SourceDocument],
        available: usize,
    ) -> (Vec<Option<BatchAnalysis>>, usize, Option<OverallInsights>) {
        if available == 0 {
            tracing::warn!("no document fetched successfully; skipping analysis calls");
            return (vec![None; batches.len()], batches.len(), None);
        }

        let mut outcomes = Vec::with_capacity(batches.len());
        let mut failed = 0;
        let mut insights = None;

        for (index, batch) in batches.iter().enumerate() {
            if index > 0 {
                sleep(self.settings.batch_delay).await;
            }
            let prompt = analysis_prompt(batch, documents);
            match self
                .caller
                .request::<BatchAnalysis>(&prompt, GenerateOptions::deterministic())
                .await
            {
                Ok(mut analysis) => {
                    tracing::info!(batch = index + 1, total = batches.len(), "batch scored");
                    if let Some(found) = analysis.overall_insights.take() {
                        insights = Some(found);
                    }
                    outcomes.push(Some(analysis));
                }
                Err(err) => {
                    tracing::warn!(
                        batch = index + 1,
                        total = batches.len(),
                        error = %err,
                        "batch failed; its items will be reported as skipped"
                    );
                    failed += 1;
                    outcomes.push(None);
                }
            }
        }

        (outcomes, failed, insights)
    }
}
