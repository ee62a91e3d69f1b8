//! LLM: chat completion for pitch synthesis.
//!
//! DESIGN
//! ======
//! `ChatCompletion` is the seam the pipeline talks to; `PerplexityClient`
//! speaks the OpenAI-compatible `/chat/completions` dialect. Prompt assembly
//! lives in [`prompt`] so it can be tested without any HTTP.

pub mod perplexity;
pub mod prompt;

use serde::Serialize;

use crate::upstream::{HttpCapture, UpstreamError};

pub use perplexity::PerplexityClient;

// =============================================================================
// TYPES
// =============================================================================

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

/// The full completion body. Credentials never live here; the client sends
/// them as a bearer header, so this struct is safe to echo into debug output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    /// Minimal request used by the diagnostics probe.
    #[must_use]
    pub fn probe(model: &str) -> Self {
        Self { model: model.to_owned(), messages: vec![Message::user("Say hello")] }
    }
}

/// A successful completion: the raw response plus the extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReply {
    pub response: HttpCapture,
    pub text: String,
}

pub type CompletionOutcome = Result<CompletionReply, UpstreamError>;

// =============================================================================
// CHAT COMPLETION TRAIT
// =============================================================================

/// Provider-neutral async trait for chat completion. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Model name placed into every request built for this provider.
    fn model(&self) -> &str;

    /// Send one completion request.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] if the key is missing, the request fails,
    /// the provider answers non-2xx, or the reply has no message text.
    async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome;
}
