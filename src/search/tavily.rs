//! Tavily search API client.
//!
//! Thin HTTP wrapper for `POST /search`. The key rides in both the body
//! (`api_key`, which Tavily has always accepted) and a bearer header.

use serde::Serialize;

use super::{SearchOutcome, SearchRequest, WebSearch};
use crate::config::{SearchConfig, TAVILY_API_KEY_VAR};
use crate::upstream::{self, UpstreamError};

pub struct TavilyClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// Wire body: the logged request plus the credential.
#[derive(Serialize)]
struct WireRequest<'a> {
    api_key: &'a str,
    #[serde(flatten)]
    request: &'a SearchRequest,
}

impl TavilyClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &SearchConfig) -> Result<Self, UpstreamError> {
        let http = upstream::build_http(config.timeouts)?;
        Ok(Self { http, api_key: config.api_key.clone(), base_url: config.base_url.clone() })
    }
}

#[async_trait::async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential { var: TAVILY_API_KEY_VAR })?;
        let url = format!("{}/search", self.base_url);
        upstream::post_json(&self.http, &url, api_key, &WireRequest { api_key, request }).await
    }
}

#[cfg(test)]
#[path = "tavily_test.rs"]
mod tests;
