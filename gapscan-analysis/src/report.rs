//! Run report: the single serializable record of an analysis run, with
//! JSON and CSV export.

use chrono::{DateTime, Utc};
use gapscan_common::{AnalysisMode, GapscanError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use crate::reconcile::ReconciledRow;
use crate::types::{OverallInsights, WorkItem};

/// What happened to one input document during acquisition.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStatus {
    pub url: String,
    /// Normalized character count; 0 when the fetch failed.
    pub chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

/// Everything a run produced, including the items it could not score.
#[derive(Debug, Serialize)]
pub struct GapReport {
    pub run_id: Uuid,
    pub topic: String,
    pub mode: AnalysisMode,
    pub generated_at: DateTime<Utc>,
    pub queries: Vec<WorkItem>,
    pub documents: Vec<DocumentStatus>,
    pub rows: Vec<ReconciledRow>,
    pub skipped: Vec<String>,
    pub failed_batches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<OverallInsights>,
}

impl GapReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GapscanError::Report(format!("report serialization failed: {e}")))
    }

    /// Tabular export. Skipped items get their own rows with a `skipped`
    /// status so the CSV, like the JSON, accounts for every work item.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record([
            "query",
            "status",
            "best_url",
            "best_score",
            "gap_description",
            "optimization_suggestion",
        ])
        .map_err(csv_err)?;

        for row in &self.rows {
            out.write_record([
                row.query.as_str(),
                "scored",
                row.best_url.as_str(),
                &row.best_score.to_string(),
                row.gap_description.as_str(),
                row.optimization_suggestion.as_str(),
            ])
            .map_err(csv_err)?;
        }
        for query in &self.skipped {
            out.write_record([query.as_str(), "skipped", "", "", "", ""])
                .map_err(csv_err)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}

fn csv_err(e: csv::Error) -> GapscanError {
    GapscanError::Report(format!("report CSV write failed: {e}"))
}
