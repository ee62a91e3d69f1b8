use super::*;
use crate::config::UpstreamTimeouts;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, api_key: Option<&str>) -> TavilyClient {
    TavilyClient::new(&SearchConfig {
        api_key: api_key.map(str::to_owned),
        base_url: server.uri(),
        max_results: 5,
        timeouts: UpstreamTimeouts { request_secs: 2, connect_secs: 1 },
    })
    .unwrap()
}

fn request() -> SearchRequest {
    SearchRequest { query: "Acme Globex cloud migration".into(), search_depth: "basic", max_results: 5 }
}

#[tokio::test]
async fn search_posts_expected_body_and_returns_raw_result() {
    let server = MockServer::start().await;
    let results = json!({ "query": "Acme Globex cloud migration", "results": [{ "title": "Globex Cloud Strategy" }] });
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("authorization", "Bearer tvly-test"))
        .and(body_json(json!({
            "api_key": "tvly-test",
            "query": "Acme Globex cloud migration",
            "search_depth": "basic",
            "max_results": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(results.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let capture = client_for(&server, Some("tvly-test"))
        .search(&request())
        .await
        .unwrap();
    assert_eq!(capture.status, 200);
    assert_eq!(capture.body, results);
}

#[tokio::test]
async fn search_upstream_503_is_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "detail": "service unavailable" })))
        .mount(&server)
        .await;

    let err = client_for(&server, Some("tvly-test"))
        .search(&request())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert!(err.to_string().contains("service unavailable"));
}

#[tokio::test]
async fn search_without_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .search(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::MissingCredential { var: "TAVILY_API_KEY" }));
    assert!(!err.was_sent());
}

#[tokio::test]
async fn search_failure_never_echoes_the_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid API key: tvly-SECRET123" })))
        .mount(&server)
        .await;

    let err = client_for(&server, Some("tvly-SECRET123"))
        .search(&request())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream returned status 401: Invalid API key: [redacted]");
    let capture = serde_json::to_string(err.response().unwrap()).unwrap();
    assert!(!capture.contains("tvly-SECRET123"), "{capture}");
}
