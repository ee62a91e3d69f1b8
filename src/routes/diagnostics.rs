//! Diagnostics routes: configuration echo and live provider probes.
//!
//! Neither endpoint ever returns key material beyond the four-character
//! preview carried by `CredentialStatus`.

use axum::extract::State;
use axum::http::Method;
use axum::response::Json;
use serde::Serialize;
use tracing::info;

use crate::llm::CompletionRequest;
use crate::search::SearchRequest;
use crate::state::AppState;
use crate::upstream::UpstreamError;

#[derive(Serialize)]
pub struct ApiTestResponse {
    pub message: &'static str,
    pub method: String,
    pub env: KeyEnv,
}

#[derive(Serialize)]
pub struct KeyEnv {
    pub tavily_key_set: bool,
    pub perplexity_key_set: bool,
    pub tavily_key_length: usize,
    pub perplexity_key_length: usize,
}

/// Result of one provider probe.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult {
    Success { response_status: u16 },
    Error { error: String },
}

impl From<Result<u16, UpstreamError>> for ProbeResult {
    fn from(outcome: Result<u16, UpstreamError>) -> Self {
        match outcome {
            Ok(response_status) => Self::Success { response_status },
            Err(err) => Self::Error { error: err.to_string() },
        }
    }
}

#[derive(Serialize)]
pub struct ProbeResults {
    pub tavily: ProbeResult,
    pub perplexity: ProbeResult,
}

#[derive(Serialize)]
pub struct KeyPreviews {
    pub tavily_key_set: bool,
    pub perplexity_key_set: bool,
    pub tavily_key_preview: String,
    pub perplexity_key_preview: String,
}

#[derive(Serialize)]
pub struct DebugApisResponse {
    pub test_results: ProbeResults,
    pub env_vars: KeyPreviews,
}

/// `ANY /api/test`: confirms the service is up and which keys are configured.
pub async fn api_test(method: Method, State(state): State<AppState>) -> Json<ApiTestResponse> {
    let creds = &state.credentials;
    Json(ApiTestResponse {
        message: "API is working!",
        method: method.to_string(),
        env: KeyEnv {
            tavily_key_set: creds.tavily_key_set,
            perplexity_key_set: creds.perplexity_key_set,
            tavily_key_length: creds.tavily_key_length,
            perplexity_key_length: creds.perplexity_key_length,
        },
    })
}

/// `GET|POST /api/debug-apis`: send one minimal request to each provider.
pub async fn debug_apis(State(state): State<AppState>) -> Json<DebugApisResponse> {
    let search_probe = SearchRequest::probe();
    let completion_probe = CompletionRequest::probe(state.llm.model());
    let (search, completion) =
        tokio::join!(state.search.search(&search_probe), state.llm.complete(&completion_probe));

    let tavily = ProbeResult::from(search.map(|capture| capture.status));
    // Any 2xx counts as reachable, even if the probe reply has no usable text.
    let perplexity = ProbeResult::from(completion.map(|reply| reply.response.status).or_else(|err| match err {
        UpstreamError::Malformed { response } => Ok(response.status),
        other => Err(other),
    }));
    info!(?tavily, ?perplexity, "diagnostics: provider probes finished");

    let creds = &state.credentials;
    Json(DebugApisResponse {
        test_results: ProbeResults { tavily, perplexity },
        env_vars: KeyPreviews {
            tavily_key_set: creds.tavily_key_set,
            perplexity_key_set: creds.perplexity_key_set,
            tavily_key_preview: creds.tavily_key_preview.clone(),
            perplexity_key_preview: creds.perplexity_key_preview.clone(),
        },
    })
}

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod tests;
