use gapscan_web::fetch::{FetchError, PageFetcher};
use gapscan_web::acquire_document;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let body = fetcher.fetch(&format!("{}/page", server.uri())).await.unwrap();
    assert_eq!(body, "<p>hi</p>");
}

#[tokio::test]
async fn non_success_status_is_a_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, FetchError::Http(404)), "got: {err:?}");
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(Duration::from_millis(300)).unwrap();
    let err = fetcher.fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout), "got: {err:?}");
}

#[tokio::test]
async fn acquire_contains_failures_in_the_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let doc = acquire_document(&fetcher, &server.uri(), 1000).await;

    assert!(!doc.is_available());
    assert!(doc.text.is_empty());
    assert!(doc.fetch_error.as_deref().unwrap().contains("500"));
}
