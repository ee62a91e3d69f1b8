//! Search: web search grounding for pitch generation.
//!
//! DESIGN
//! ======
//! `WebSearch` is the seam the pipeline talks to; `TavilyClient` is the only
//! production implementation. The result is forwarded to the completion
//! prompt untouched, so it stays an opaque `serde_json::Value` here.

pub mod tavily;

use serde::Serialize;

use crate::services::pitch::PitchRequest;
use crate::upstream::{HttpCapture, UpstreamError};

pub use tavily::TavilyClient;

/// Outcome of one search call. `Ok` carries the raw provider response.
pub type SearchOutcome = Result<HttpCapture, UpstreamError>;

/// The credential-free search body. This is exactly what the debug record
/// shows; the provider client adds the key when it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub search_depth: &'static str,
    pub max_results: u32,
}

impl SearchRequest {
    /// Query for a pitch: provider name, customer name and context joined by spaces.
    #[must_use]
    pub fn for_pitch(request: &PitchRequest, max_results: u32) -> Self {
        let query = [
            request.provider.name.as_str(),
            request.customer.name.as_str(),
            request.context.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
        Self { query, search_depth: "basic", max_results }
    }

    /// Minimal request used by the diagnostics probe.
    #[must_use]
    pub fn probe() -> Self {
        Self { query: "test query".to_owned(), search_depth: "basic", max_results: 1 }
    }
}

/// Provider-neutral async trait for web search. Enables mocking in tests.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    /// Run one search.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] when the key is missing, the provider is
    /// unreachable, or it answers with a non-2xx status.
    async fn search(&self, request: &SearchRequest) -> SearchOutcome;
}
