//! Pitch generation route.
//!
//! Accepts both body layouts clients have used: nested
//! `{ serviceProvider: { name, url }, targetCustomer: {...}, context }` and
//! the older flat `{ serviceProviderName, serviceProviderUrl, ... }`. Both are
//! folded into one `PitchRequest` here, so nothing past this module ever
//! branches on input shape.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::config::{CredentialStatus, parse_bool};
use crate::services::pitch::{self, DebugRecord, ErrorDetail, Party, PipelineError, PitchOutcome, PitchRequest};
use crate::state::AppState;

// =============================================================================
// INBOUND
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PartyBody {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratePitchBody {
    pub service_provider: Option<PartyBody>,
    pub target_customer: Option<PartyBody>,
    pub service_provider_name: Option<String>,
    pub service_provider_url: Option<String>,
    pub target_customer_name: Option<String>,
    pub target_customer_url: Option<String>,
    pub context: Option<String>,
    pub debug: Option<bool>,
}

impl GeneratePitchBody {
    /// Normalize either layout into a canonical request. Nested fields win
    /// over flat ones when a client sends both.
    #[must_use]
    pub fn into_request(self, debug_query: bool) -> PitchRequest {
        PitchRequest {
            provider: merge_party(self.service_provider, self.service_provider_name, self.service_provider_url),
            customer: merge_party(self.target_customer, self.target_customer_name, self.target_customer_url),
            context: self.context.map(|c| c.trim().to_owned()).unwrap_or_default(),
            debug_requested: self.debug.unwrap_or(false) || debug_query,
        }
    }
}

fn merge_party(nested: Option<PartyBody>, flat_name: Option<String>, flat_url: Option<String>) -> Party {
    let nested = nested.unwrap_or_default();
    Party {
        name: nested.name.or(flat_name).map(|n| n.trim().to_owned()).unwrap_or_default(),
        url: nested.url.or(flat_url).map(|u| u.trim().to_owned()).unwrap_or_default(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DebugQuery {
    pub debug: Option<String>,
}

// =============================================================================
// RESPONSE ASSEMBLY
// =============================================================================

#[derive(Serialize)]
struct SuccessEnvelope<'a> {
    result: &'a str,
    tavily_key_set: bool,
    perplexity_key_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<&'a DebugRecord>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    message: &'a str,
    error: String,
    tavily_key_set: bool,
    perplexity_key_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<&'a DebugRecord>,
}

/// HTTP status for a failed run, honoring the legacy uniform-500 switch.
pub(crate) fn failure_status(err: &PipelineError, legacy_status_codes: bool) -> StatusCode {
    if legacy_status_codes {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Map a terminal pipeline state to the caller-facing envelope.
pub(crate) fn assemble(outcome: &PitchOutcome, credentials: &CredentialStatus, legacy_status_codes: bool) -> Response {
    let debug = outcome.debug.as_ref();
    match &outcome.result {
        Ok(html) => Json(SuccessEnvelope {
            result: html,
            tavily_key_set: credentials.tavily_key_set,
            perplexity_key_set: credentials.perplexity_key_set,
            debug,
        })
        .into_response(),
        Err(err) => {
            let status = failure_status(err, legacy_status_codes);
            let body = ErrorEnvelope {
                message: status.canonical_reason().unwrap_or("Error"),
                error: err.to_string(),
                tavily_key_set: credentials.tavily_key_set,
                perplexity_key_set: credentials.perplexity_key_set,
                debug,
            };
            (status, Json(body)).into_response()
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/generate-info`: run the search and completion, then render one pitch.
pub async fn generate_info(
    State(state): State<AppState>,
    Query(query): Query<DebugQuery>,
    payload: Result<Json<GeneratePitchBody>, JsonRejection>,
) -> Response {
    let debug_query = query.debug.as_deref().and_then(parse_bool).unwrap_or(false);

    let outcome = match payload {
        Ok(Json(body)) => pitch::generate_pitch(&state, body.into_request(debug_query)).await,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "pitch: rejected request body");
            let err = PipelineError::Validation(format!("invalid request body: {}", rejection.body_text()));
            let debug = debug_query.then(|| DebugRecord {
                error: Some(ErrorDetail::from(&err)),
                ..DebugRecord::new(&PitchRequest::default())
            });
            PitchOutcome { result: Err(err), debug }
        }
    };

    assemble(&outcome, &state.credentials, state.legacy_status_codes)
}

/// `OPTIONS /api/generate-info`: bare preflight, empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on the pitch route.
pub async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, Json(serde_json::json!({ "error": "Method not allowed" }))).into_response()
}

#[cfg(test)]
#[path = "pitch_test.rs"]
mod tests;
