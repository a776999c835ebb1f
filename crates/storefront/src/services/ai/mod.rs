//! AI-assisted product search.
//!
//! - [`retry`]: backoff for rate-limited provider calls
//! - [`embeddings`]: 768-dimensional text embeddings via Gemini
//! - [`vision`]: image description through a chain of vision-capable chat models
//! - [`search`]: the `/api/search/ai` orchestration, including the keyword fallback

pub mod embeddings;
pub mod retry;
pub mod search;
pub mod vision;

use thiserror::Error;

pub use embeddings::{EMBEDDING_DIMENSIONS, GeminiEmbeddingClient, TextEmbedder};
pub use retry::{RetryPolicy, with_quota_retry};
pub use search::{AiSearch, AiSearchError, AiSearchOutcome, AiSearchRequest, ProductIndex};
pub use vision::{ChatModel, ImageDescription, VisionChain, VisionModel};

/// Errors from external model providers.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The provider answered 2xx but the body was not what we asked for.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("expected {expected}-dimensional embedding, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No API key for the provider.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("All AI vision models failed")]
    AllModelsFailed,
}

impl AiError {
    /// Whether the provider is rate limiting or out of quota.
    #[must_use]
    pub fn is_quota(&self) -> bool {
        if let Self::Api { status: 429, .. } = self {
            return true;
        }
        let message = self.to_string();
        message.contains("429") || message.to_lowercase().contains("quota")
    }
}

/// Pull the provider's error message out of a JSON error body, if present.
pub(crate) fn api_error_message(body: &serde_json::Value, fallback: &str) -> String {
    body.pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| fallback.to_owned(), ToOwned::to_owned)
}
