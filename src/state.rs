//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the two upstream clients behind trait objects plus the startup
//! facts the response envelope reports. All of it is read-only after
//! startup; per-request data never lands here.

use std::sync::Arc;

use crate::config::{AppConfig, CredentialStatus};
use crate::llm::{ChatCompletion, PerplexityClient};
use crate::search::{TavilyClient, WebSearch};
use crate::upstream::UpstreamError;

/// Clone is required by Axum. The clients are Arc-wrapped, the rest is small.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn WebSearch>,
    pub llm: Arc<dyn ChatCompletion>,
    pub search_max_results: u32,
    pub credentials: CredentialStatus,
    /// Report every failure as 500 instead of the classified status.
    pub legacy_status_codes: bool,
}

impl AppState {
    /// Build production state with real provider clients.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client fails to build.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            search: Arc::new(TavilyClient::new(&config.search)?),
            llm: Arc::new(PerplexityClient::new(&config.completion)?),
            search_max_results: config.search.max_results,
            credentials: config.credential_status(),
            legacy_status_codes: config.legacy_status_codes,
        })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
