use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gapscan_analysis::caller::ResilientCaller;
use gapscan_analysis::memo::InputMemo;
use gapscan_analysis::pipeline::{GapPipeline, PipelineSettings};
use gapscan_common::observability::{init_logging, LogConfig};
use gapscan_common::{AnalysisMode, ReportFormat};
use gapscan_config::{GapscanConfig, GapscanConfigLoader, LlmSettings};
use gapscan_llm::gemini::GeminiClient;
use gapscan_reddit::sheet::{enrich_csv, SheetOptions};
use gapscan_web::fetch::PageFetcher;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "gapscan",
    version,
    about = "Content gap analysis and Reddit sheet enrichment"
)]
struct Cli {
    /// Configuration file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "gapscan.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate research queries for a topic and score pages against them.
    Analyze {
        #[arg(long)]
        topic: String,

        /// Page to analyze; repeat the flag for multiple pages.
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        #[arg(long, default_value_t = AnalysisMode::Simple)]
        mode: AnalysisMode,

        #[arg(long, default_value_t = ReportFormat::Json)]
        format: ReportFormat,

        /// Output path; the report goes to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Enrich a CSV of Reddit post links with scraped post details.
    Reddit {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// URL column name; auto-detected when omitted.
        #[arg(long)]
        column: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg: GapscanConfig = GapscanConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .context("loading configuration")?;

    init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    match cli.command {
        Command::Analyze {
            topic,
            urls,
            mode,
            format,
            output,
        } => run_analyze(cfg, topic, urls, mode, format, output).await,
        Command::Reddit {
            input,
            output,
            column,
        } => run_reddit(cfg, input, output, column).await,
    }
}

async fn run_analyze(
    cfg: GapscanConfig,
    topic: String,
    urls: Vec<String>,
    mode: AnalysisMode,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    // Fails before any fetch or model call when credentials are absent.
    let api_key = cfg.require_api_key()?.to_string();
    let LlmSettings::Gemini { model, .. } = cfg.llm;

    let client = GeminiClient::new(api_key, model)?;
    let caller = ResilientCaller::new(Arc::new(client))
        .with_max_attempts(cfg.analysis.max_attempts)
        .with_backoff(Duration::from_secs(cfg.analysis.backoff_secs));
    let fetcher = PageFetcher::new(Duration::from_secs(cfg.fetch.timeout_secs))?;

    let pipeline = GapPipeline::new(
        caller,
        fetcher,
        PipelineSettings {
            mode,
            batch_size: cfg.analysis.batch_size,
            content_budget: cfg.analysis.content_budget,
            batch_delay: Duration::from_secs(cfg.analysis.batch_delay_secs),
        },
    );

    let mut memo = InputMemo::new();
    let report = pipeline.run(&topic, &urls, &mut memo).await?;
    tracing::info!(
        run_id = %report.run_id,
        rows = report.rows.len(),
        skipped = report.skipped.len(),
        failed_batches = report.failed_batches,
        "analysis finished"
    );

    match format {
        ReportFormat::Json => {
            let json = report.to_json_pretty()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("writing report to {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        ReportFormat::Csv => match output {
            Some(path) => report.write_csv_file(&path)?,
            None => report.write_csv(std::io::stdout().lock())?,
        },
    }
    Ok(())
}

async fn run_reddit(
    cfg: GapscanConfig,
    input: PathBuf,
    output: PathBuf,
    column: Option<String>,
) -> Result<()> {
    let fetcher = PageFetcher::new(Duration::from_secs(cfg.fetch.timeout_secs))?;
    let opts = SheetOptions {
        url_column: column,
        row_delay: Duration::from_secs(cfg.reddit.row_delay_secs),
        ..SheetOptions::default()
    };

    let summary = enrich_csv(&fetcher, &input, &output, &opts).await?;
    tracing::info!(
        rows = summary.rows,
        processed = summary.processed,
        column = %summary.url_column,
        "enrichment finished"
    );
    println!(
        "Processed {} of {} rows (URL column: {}) -> {}",
        summary.processed,
        summary.rows,
        summary.url_column,
        output.display()
    );
    Ok(())
}
