//! Pitch service: search → completion → render.
//!
//! DESIGN
//! ======
//! One linear run per request:
//!
//! ```text
//! Start → Searching → Completing → Rendering → Done
//!   └────────┴────────────┴──────────┴──→ Failed
//! ```
//!
//! Validation happens before any upstream call. Every failure past that
//! point is caught here and turned into a classified `PipelineError`; the
//! route layer only has to shape the envelope. When the caller asks for
//! debug output, each stage appends the exact body it sent and the response
//! it got, right after the stage resolves. Nothing else is shared between
//! runs, so there is no locking.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::render;
use crate::llm::CompletionRequest;
use crate::llm::prompt;
use crate::search::SearchRequest;
use crate::state::AppState;
use crate::upstream::{Dependency, HttpCapture, UpstreamError};

// =============================================================================
// TYPES
// =============================================================================

/// A named entity with a reference URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Party {
    pub name: String,
    pub url: String,
}

/// One normalized pitch request, independent of the inbound body shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PitchRequest {
    #[serde(rename = "serviceProvider")]
    pub provider: Party,
    #[serde(rename = "targetCustomer")]
    pub customer: Party,
    pub context: String,
    #[serde(skip)]
    pub debug_requested: bool,
}

impl PitchRequest {
    /// Check that both party names and the context are present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] naming every missing field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let missing: Vec<&str> = [
            ("serviceProvider.name", &self.provider.name),
            ("targetCustomer.name", &self.customer.name),
            ("context", &self.context),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Validation(format!("missing required fields: {}", missing.join(", "))))
        }
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Required input fields were missing; no upstream was called.
    #[error("{0}")]
    Validation(String),

    /// A provider call failed or returned something unusable.
    #[error("{dependency} request failed: {source}")]
    Upstream {
        dependency: Dependency,
        #[source]
        source: UpstreamError,
    },

    /// Rendering or another failure on our side.
    #[error("{0}")]
    Internal(String),
}

/// Coarse failure class used for status mapping and the debug record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Upstream,
    Internal,
}

impl PipelineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            // A missing key never reached the provider: that's our config, not theirs.
            Self::Upstream { source, .. } if !source.was_sent() => ErrorKind::Internal,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub fn dependency(&self) -> Option<Dependency> {
        match self {
            Self::Upstream { dependency, .. } => Some(*dependency),
            _ => None,
        }
    }

    #[must_use]
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::Upstream { source, .. } => Some(source),
            _ => None,
        }
    }

    /// HTTP status for this failure: 400, 502, 504 or 500.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match (self.kind(), self.upstream()) {
            (ErrorKind::Validation, _) => 400,
            (ErrorKind::Upstream, Some(UpstreamError::Timeout)) => 504,
            (ErrorKind::Upstream, _) => 502,
            (ErrorKind::Internal, _) => 500,
        }
    }
}

// =============================================================================
// DEBUG RECORD
// =============================================================================

/// What one stage sent and, on success, what it got back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord<R> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpCapture>,
}

impl<R> Default for StageRecord<R> {
    fn default() -> Self {
        Self { request: None, response: None }
    }
}

impl<R> StageRecord<R> {
    /// Record a resolved stage. A call that never left the process is not
    /// recorded at all; a failed call keeps its request only.
    fn record(&mut self, request: R, outcome: Result<&HttpCapture, &UpstreamError>) {
        if let Err(err) = outcome {
            if !err.was_sent() {
                return;
            }
        }
        self.request = Some(request);
        self.response = outcome.ok().cloned();
    }
}

/// Failure summary surfaced to debug callers. Built only from our own
/// messages and provider responses, which arrive with any echoed key
/// already redacted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<Dependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpCapture>,
}

impl From<&PipelineError> for ErrorDetail {
    fn from(err: &PipelineError) -> Self {
        let upstream = err.upstream();
        Self {
            kind: err.kind(),
            dependency: err.dependency(),
            status: upstream.and_then(UpstreamError::status_code),
            detail: err.to_string(),
            response: upstream.and_then(UpstreamError::response).cloned(),
        }
    }
}

/// Per-request trace of every upstream exchange, present only on request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugRecord {
    pub request: PitchRequest,
    pub search: StageRecord<SearchRequest>,
    pub completion: StageRecord<CompletionRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl DebugRecord {
    pub(crate) fn new(request: &PitchRequest) -> Self {
        Self {
            request: request.clone(),
            search: StageRecord::default(),
            completion: StageRecord::default(),
            error: None,
        }
    }
}

/// Terminal state of one run.
#[derive(Debug)]
pub struct PitchOutcome {
    pub result: Result<String, PipelineError>,
    pub debug: Option<DebugRecord>,
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Run the full pipeline for one request. Never fails past this boundary:
/// every error is folded into [`PitchOutcome::result`].
pub async fn generate_pitch(state: &AppState, request: PitchRequest) -> PitchOutcome {
    let span = info_span!("pitch", request_id = %Uuid::new_v4(), debug = request.debug_requested);
    async move {
        let mut debug = request.debug_requested.then(|| DebugRecord::new(&request));
        let result = run_stages(state, &request, debug.as_mut()).await;

        match &result {
            Ok(html) => info!(html_len = html.len(), "pitch: done"),
            Err(err) => warn!(
                kind = ?err.kind(),
                dependency = err.dependency().map(Dependency::as_str),
                error = %err,
                "pitch: failed"
            ),
        }

        if let (Err(err), Some(record)) = (&result, debug.as_mut()) {
            record.error = Some(ErrorDetail::from(err));
        }
        PitchOutcome { result, debug }
    }
    .instrument(span)
    .await
}

async fn run_stages(
    state: &AppState,
    request: &PitchRequest,
    mut debug: Option<&mut DebugRecord>,
) -> Result<String, PipelineError> {
    request.validate()?;

    // Searching
    let search_request = SearchRequest::for_pitch(request, state.search_max_results);
    info!(query_len = search_request.query.len(), "pitch: searching");
    let outcome = state.search.search(&search_request).await;
    if let Some(record) = debug.as_deref_mut() {
        record.search.record(search_request, outcome.as_ref());
    }
    let search_result = outcome
        .map_err(|source| PipelineError::Upstream { dependency: Dependency::Search, source })?
        .body;
    debug!(result_bytes = search_result.to_string().len(), "pitch: search ok");

    // Completing
    let completion_request = prompt::build_pitch_request(state.llm.model(), request, &search_result);
    info!(model = %completion_request.model, "pitch: completing");
    let outcome = state.llm.complete(&completion_request).await;
    if let Some(record) = debug.as_deref_mut() {
        record
            .completion
            .record(completion_request, outcome.as_ref().map(|reply| &reply.response));
    }
    let reply = outcome.map_err(|source| PipelineError::Upstream { dependency: Dependency::Completion, source })?;
    debug!(text_len = reply.text.len(), "pitch: completion ok");

    // Rendering
    panic::catch_unwind(AssertUnwindSafe(|| render::markdown_to_html(&reply.text)))
        .map_err(|_| PipelineError::Internal("markdown rendering failed".to_string()))
}

#[cfg(test)]
#[path = "pitch_test.rs"]
mod tests;
