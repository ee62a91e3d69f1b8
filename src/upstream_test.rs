use super::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_timeouts() -> UpstreamTimeouts {
    UpstreamTimeouts { request_secs: 1, connect_secs: 1 }
}

// =============================================================================
// UpstreamError
// =============================================================================

#[test]
fn status_error_reports_code_and_message() {
    let err = UpstreamError::Status {
        response: HttpCapture { status: 401, body: json!({ "detail": { "error": "bad key" }, "message": "Unauthorized" }) },
    };
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.to_string(), "upstream returned status 401: Unauthorized");
}

#[test]
fn status_error_without_message_is_bare() {
    let err = UpstreamError::Status { response: HttpCapture { status: 503, body: json!({}) } };
    assert_eq!(err.to_string(), "upstream returned status 503");
}

#[test]
fn status_error_uses_plain_text_body() {
    let err = UpstreamError::Status { response: HttpCapture { status: 502, body: json!("Bad Gateway") } };
    assert_eq!(err.to_string(), "upstream returned status 502: Bad Gateway");
}

#[test]
fn nested_error_message_is_found() {
    let err = UpstreamError::Status {
        response: HttpCapture { status: 400, body: json!({ "error": { "message": "model not found" } }) },
    };
    assert_eq!(err.to_string(), "upstream returned status 400: model not found");
}

#[test]
fn malformed_has_fixed_detail() {
    let err = UpstreamError::Malformed { response: HttpCapture { status: 200, body: json!({}) } };
    assert_eq!(err.to_string(), "malformed upstream response");
    assert_eq!(err.status_code(), Some(200));
}

#[test]
fn local_failures_were_not_sent() {
    assert!(!UpstreamError::MissingCredential { var: "TAVILY_API_KEY" }.was_sent());
    assert!(!UpstreamError::HttpClientBuild("tls".into()).was_sent());
    assert!(UpstreamError::Timeout.was_sent());
    assert!(UpstreamError::Transport("reset".into()).was_sent());
    assert_eq!(UpstreamError::Timeout.status_code(), None);
}

#[test]
fn parse_body_keeps_non_json_verbatim() {
    assert_eq!(parse_body("{\"a\":1}".into()), json!({ "a": 1 }));
    assert_eq!(parse_body("<html>oops</html>".into()), json!("<html>oops</html>"));
    assert_eq!(parse_body(String::new()), json!(""));
}

// =============================================================================
// post_json
// =============================================================================

#[tokio::test]
async fn post_json_sends_bearer_and_captures_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("authorization", "Bearer secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let http = build_http(fast_timeouts()).unwrap();
    let capture = post_json(&http, &format!("{}/echo", server.uri()), "secret-key", &json!({ "q": 1 }))
        .await
        .unwrap();
    assert_eq!(capture, HttpCapture { status: 200, body: json!({ "ok": true }) });
}

#[tokio::test]
async fn post_json_non_success_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let http = build_http(fast_timeouts()).unwrap();
    let err = post_json(&http, &server.uri(), "k", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(&err, UpstreamError::Status { response } if response.status == 503));
    assert_eq!(err.response().map(|r| r.body.clone()), Some(json!("overloaded")));
}

#[tokio::test]
async fn post_json_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    let http = build_http(fast_timeouts()).unwrap();
    let err = post_json(&http, &server.uri(), "k", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn post_json_unreachable_host_is_transport_error() {
    let http = build_http(fast_timeouts()).unwrap();
    let err = post_json(&http, "http://127.0.0.1:9/nothing", "k", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Transport(_) | UpstreamError::Timeout), "got {err:?}");
    assert!(err.was_sent());
}

// =============================================================================
// Redaction
// =============================================================================

#[test]
fn redact_replaces_secret_in_nested_strings() {
    let mut body = json!({
        "detail": "Invalid API key: tvly-SECRET123",
        "errors": [{ "echo": "tvly-SECRET123" }, 7],
        "ok": false
    });
    redact(&mut body, "tvly-SECRET123");
    assert_eq!(
        body,
        json!({
            "detail": "Invalid API key: [redacted]",
            "errors": [{ "echo": "[redacted]" }, 7],
            "ok": false
        })
    );
}

#[test]
fn redact_ignores_empty_secret() {
    let mut body = json!("unchanged");
    redact(&mut body, "");
    assert_eq!(body, json!("unchanged"));
}

#[tokio::test]
async fn post_json_redacts_echoed_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key secret-key"))
        .mount(&server)
        .await;

    let http = build_http(fast_timeouts()).unwrap();
    let err = post_json(&http, &server.uri(), "secret-key", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream returned status 401: bad key [redacted]");
    assert_eq!(err.response().map(|r| r.body.clone()), Some(json!("bad key [redacted]")));
}
