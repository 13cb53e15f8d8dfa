//! Full-pipeline tests against a scripted model and wiremock-served pages.

use async_trait::async_trait;
use gapscan_analysis::caller::ResilientCaller;
use gapscan_analysis::memo::InputMemo;
use gapscan_analysis::pipeline::{GapPipeline, PipelineSettings};
use gapscan_common::AnalysisMode;
use gapscan_llm::traits::{GenerateOptions, LlmClient, LlmError, LlmResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gapscan_web::fetch::PageFetcher;

/// Stand-in model: answers the fan-out prompt with a fixed query list and
/// batch prompts with full breakdowns, except for batches containing a
/// poison query, which always get unparseable text.
struct StubModel {
    queries: Vec<String>,
    good_url: String,
    poison: Option<String>,
    fanout_calls: AtomicUsize,
}

impl StubModel {
    fn new(count: usize, good_url: &str, poison: Option<&str>) -> Self {
        Self {
            queries: (0..count).map(|i| format!("q{i}")).collect(),
            good_url: good_url.to_string(),
            poison: poison.map(str::to_string),
            fanout_calls: AtomicUsize::new(0),
        }
    }

    fn fanout_reply(&self) -> String {
        let items: Vec<serde_json::Value> = self
            .queries
            .iter()
            .map(|q| serde_json::json!({ "query": q, "type": "question_based" }))
            .collect();
        serde_json::json!({
            "analysis_details": { "target_query_count": self.queries.len() },
            "content_gap_queries": items,
        })
        .to_string()
    }

    fn batch_reply(&self, prompt: &str) -> String {
        let listed: Vec<&str> = prompt
            .lines()
            .filter_map(|line| line.strip_prefix("- "))
            .collect();
        let rows: Vec<serde_json::Value> = listed
            .iter()
            .map(|q| {
                let mut per_url = serde_json::Map::new();
                per_url.insert(
                    self.good_url.clone(),
                    serde_json::json!({
                        "coverage_score": 5,
                        "gap_description": "thin coverage",
                        "optimization_suggestion": "expand the section"
                    }),
                );
                serde_json::json!({ "query": q, "analysis_per_url": per_url })
            })
            .collect();
        serde_json::json!({ "batch_analysis": rows }).to_string()
    }
}

#[async_trait]
impl LlmClient for StubModel {
    async fn generate(
        &self,
        prompt: &str,
        _opts: GenerateOptions,
    ) -> Result<LlmResponse, LlmError> {
        let text = if prompt.contains("content_gap_queries") {
            self.fanout_calls.fetch_add(1, Ordering::SeqCst);
            self.fanout_reply()
        } else if self
            .poison
            .as_deref()
            .is_some_and(|p| prompt.contains(&format!("- {p}\n")))
        {
            "this is not json".to_string()
        } else {
            self.batch_reply(prompt)
        };
        Ok(LlmResponse {
            text,
            model: Some("stub".to_string()),
            tokens_used: None,
        })
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

fn pipeline(model: Arc<StubModel>, fetcher: PageFetcher, batch_size: usize) -> GapPipeline {
    let caller = ResilientCaller::new(model).with_backoff(Duration::ZERO);
    GapPipeline::new(
        caller,
        fetcher,
        PipelineSettings {
            mode: AnalysisMode::Simple,
            batch_size,
            content_budget: 5000,
            batch_delay: Duration::ZERO,
        },
    )
}

async fn serve_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn failed_middle_batch_skips_only_its_items() {
    let server = MockServer::start().await;
    serve_page(&server, "/page", "<html><body><p>alpha beta</p></body></html>").await;
    let url = format!("{}/page", server.uri());

    // 23 queries at batch size 10 plan as [10, 10, 3]; q10 poisons batch 2.
    let model = Arc::new(StubModel::new(23, &url, Some("q10")));
    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let pipe = pipeline(model, fetcher, 10);

    let mut memo = InputMemo::new();
    let report = pipe
        .run("rust async", &[url.clone()], &mut memo)
        .await
        .unwrap();

    assert_eq!(report.queries.len(), 23);
    assert_eq!(report.rows.len(), 20);
    assert_eq!(report.skipped.len(), 10);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(
        report.skipped,
        (10..20).map(|i| format!("q{i}")).collect::<Vec<_>>()
    );
    assert!(report.rows.iter().all(|r| r.best_url == url));
}

#[tokio::test]
async fn timed_out_document_never_aborts_siblings() {
    let server = MockServer::start().await;
    serve_page(&server, "/fast", "<html><body>useful words here</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fast = format!("{}/fast", server.uri());
    let slow = format!("{}/slow", server.uri());

    let model = Arc::new(StubModel::new(3, &fast, None));
    let fetcher = PageFetcher::new(Duration::from_millis(300)).unwrap();
    let pipe = pipeline(model, fetcher, 10);

    let mut memo = InputMemo::new();
    let report = pipe
        .run("rust async", &[slow.clone(), fast.clone()], &mut memo)
        .await
        .unwrap();

    // The slow document is reported with its error marker, and every
    // query still gets scored against the document that did load.
    let slow_status = report.documents.iter().find(|d| d.url == slow).unwrap();
    assert!(slow_status.fetch_error.is_some());
    assert_eq!(slow_status.chars, 0);

    assert_eq!(report.rows.len(), 3);
    assert!(report.skipped.is_empty());
    assert!(report.rows.iter().all(|r| r.best_url == fast));
}

#[tokio::test]
async fn unchanged_topic_and_mode_reuse_the_memoized_queries() {
    let server = MockServer::start().await;
    serve_page(&server, "/page", "<html><body>content</body></html>").await;
    let url = format!("{}/page", server.uri());

    let model = Arc::new(StubModel::new(2, &url, None));
    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let pipe = pipeline(model.clone(), fetcher, 10);

    let mut memo = InputMemo::new();
    let urls = vec![url];
    pipe.run("rust async", &urls, &mut memo).await.unwrap();
    pipe.run("rust async", &urls, &mut memo).await.unwrap();

    assert_eq!(model.fanout_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn all_documents_failing_skips_every_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let url = format!("{}/gone", server.uri());

    let model = Arc::new(StubModel::new(4, &url, None));
    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let pipe = pipeline(model, fetcher, 2);

    let mut memo = InputMemo::new();
    let report = pipe.run("rust async", &[url], &mut memo).await.unwrap();

    assert!(report.rows.is_empty());
    assert_eq!(report.skipped.len(), 4);
    assert_eq!(report.failed_batches, 2);
}
