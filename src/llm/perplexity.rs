//! Perplexity chat completions client.
//!
//! OpenAI-compatible `POST /chat/completions`. Pure parsing in
//! [`extract_text`] for testability.

use serde_json::Value;

use super::{ChatCompletion, CompletionOutcome, CompletionReply, CompletionRequest};
use crate::config::{CompletionConfig, PERPLEXITY_API_KEY_VAR};
use crate::upstream::{self, HttpCapture, UpstreamError};

pub struct PerplexityClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl PerplexityClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CompletionConfig) -> Result<Self, UpstreamError> {
        let http = upstream::build_http(config.timeouts)?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ChatCompletion for PerplexityClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential { var: PERPLEXITY_API_KEY_VAR })?;
        let url = format!("{}/chat/completions", self.base_url);
        let response = upstream::post_json(&self.http, &url, api_key, request).await?;
        reply_from(response)
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// `choices[0].message.content`, when present and non-blank.
pub(crate) fn extract_text(root: &Value) -> Option<String> {
    root.get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_owned)
}

/// A 2xx capture becomes a reply, or `Malformed` when the text is missing.
pub(crate) fn reply_from(response: HttpCapture) -> CompletionOutcome {
    match extract_text(&response.body) {
        Some(text) => Ok(CompletionReply { response, text }),
        None => Err(UpstreamError::Malformed { response }),
    }
}

#[cfg(test)]
#[path = "perplexity_test.rs"]
mod tests;
