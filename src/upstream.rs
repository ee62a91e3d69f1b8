//! Upstream: shared HTTP plumbing for the search and completion providers.
//!
//! DESIGN
//! ======
//! Both providers are "POST a JSON body, get a JSON body back". This module
//! owns the `reqwest` client construction, the single send path, and the
//! error taxonomy so the two provider modules only deal with their own wire
//! shapes. Every response is captured as `{ status, body }` for the debug
//! record; a body that isn't JSON is kept verbatim as a JSON string. Any
//! echo of the credential inside a captured body is replaced with
//! [`REDACTED`] before the capture leaves this module.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::UpstreamTimeouts;

/// Stands in for the credential wherever a provider echoes it back.
pub const REDACTED: &str = "[redacted]";

// =============================================================================
// TYPES
// =============================================================================

/// Which external dependency a call or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    Search,
    Completion,
}

impl Dependency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Completion => "completion",
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of one upstream response, exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpCapture {
    pub status: u16,
    pub body: Value,
}

// =============================================================================
// ERROR
// =============================================================================

/// Failure of a single upstream call.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The provider key was not configured; nothing was sent.
    #[error("credential not configured: env var {var} not set")]
    MissingCredential { var: &'static str },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Connection, TLS or body-read failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// The call exceeded the configured request timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider answered with a non-2xx status.
    #[error("{}", status_detail(.response))]
    Status { response: HttpCapture },

    /// 2xx, but the body did not have the expected shape.
    #[error("malformed upstream response")]
    Malformed { response: HttpCapture },
}

impl UpstreamError {
    /// HTTP status reported by the provider, if one was received.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// The response received before the call was judged a failure.
    #[must_use]
    pub fn response(&self) -> Option<&HttpCapture> {
        match self {
            Self::Status { response } | Self::Malformed { response } => Some(response),
            _ => None,
        }
    }

    /// `false` when the failure happened before any bytes left the process.
    #[must_use]
    pub fn was_sent(&self) -> bool {
        !matches!(self, Self::MissingCredential { .. } | Self::HttpClientBuild(_))
    }
}

fn status_detail(response: &HttpCapture) -> String {
    format!("upstream returned status {}{}", response.status, error_suffix(&response.body))
}

/// Pull a human-readable message out of a provider error body, if any.
fn error_suffix(body: &Value) -> String {
    let message = match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        Value::Object(map) => ["detail", "message", "error"]
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(|v| match v {
                Value::String(s) => Some(s.as_str()),
                Value::Object(inner) => inner.get("message").and_then(Value::as_str),
                _ => None,
            }),
        _ => None,
    };
    match message {
        Some(m) => format!(": {}", truncate(m.trim(), 200)),
        None => String::new(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_owned();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push('…');
    out
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Build a `reqwest` client with the configured per-call timeouts.
///
/// # Errors
///
/// Returns [`UpstreamError::HttpClientBuild`] if the TLS backend fails to initialize.
pub fn build_http(timeouts: UpstreamTimeouts) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| UpstreamError::HttpClientBuild(e.to_string()))
}

/// POST `body` as JSON with a bearer credential and capture the response.
///
/// # Errors
///
/// Transport failures map to [`UpstreamError::Transport`] or
/// [`UpstreamError::Timeout`]; a non-2xx reply maps to [`UpstreamError::Status`].
pub async fn post_json(
    http: &reqwest::Client,
    url: &str,
    credential: &str,
    body: &impl Serialize,
) -> Result<HttpCapture, UpstreamError> {
    let response = http
        .post(url)
        .bearer_auth(credential)
        .json(body)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;
    let mut body = parse_body(text);
    redact(&mut body, credential);
    let capture = HttpCapture { status: status.as_u16(), body };

    if !status.is_success() {
        return Err(UpstreamError::Status { response: capture });
    }
    Ok(capture)
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

pub(crate) fn parse_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// Replace every occurrence of `secret` in the string leaves of `value`.
pub(crate) fn redact(value: &mut Value, secret: &str) {
    if secret.is_empty() {
        return;
    }
    match value {
        Value::String(s) if s.contains(secret) => *s = s.replace(secret, REDACTED),
        Value::Array(items) => items.iter_mut().for_each(|item| redact(item, secret)),
        Value::Object(map) => map.values_mut().for_each(|item| redact(item, secret)),
        _ => {}
    }
}

#[cfg(test)]
#[path = "upstream_test.rs"]
mod tests;
