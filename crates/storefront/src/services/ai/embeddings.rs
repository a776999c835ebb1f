//! Text embeddings via the Gemini `embedContent` REST endpoint.

use std::future::Future;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{AiError, api_error_message};

/// Width of `storefront.products.embedding`.
pub const EMBEDDING_DIMENSIONS: usize = 768;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const EMBEDDING_MODEL: &str = "gemini-embedding-001";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns text into a fixed-width vector.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, AiError>> + Send;
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini embedding client. Without an API key every call fails with
/// `AiError::NotConfigured`.
#[derive(Clone)]
pub struct GeminiEmbeddingClient {
    http: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl GeminiEmbeddingClient {
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: Option<SecretString>) -> Self {
        Self {
            http,
            api_key,
            base_url: GEMINI_BASE_URL.to_owned(),
        }
    }

    /// Point at a different host (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl TextEmbedder for GeminiEmbeddingClient {
    #[instrument(skip_all, fields(chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(AiError::NotConfigured("GOOGLE_API_KEY"))?;

        let url = format!(
            "{}/v1beta/models/{EMBEDDING_MODEL}:embedContent",
            self.base_url
        );
        let payload = json!({
            "model": format!("models/{EMBEDDING_MODEL}"),
            "content": { "parts": [{ "text": text }] },
            "outputDimensionality": EMBEDDING_DIMENSIONS,
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(AiError::Api {
                provider: "Gemini",
                status: status.as_u16(),
                message: format!(
                    "Embedding API error: {}",
                    api_error_message(&body, status.canonical_reason().unwrap_or("error"))
                ),
            });
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(format!("embedding body: {e}")))?;
        let values = parsed.embedding.values;
        if values.len() != EMBEDDING_DIMENSIONS {
            return Err(AiError::DimensionMismatch {
                expected: EMBEDDING_DIMENSIONS,
                actual: values.len(),
            });
        }

        debug!(dims = values.len(), "Embedded text");
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let client = GeminiEmbeddingClient::new(reqwest::Client::new(), None);
        assert!(!client.is_configured());
        let err = client.embed("gold ring").await;
        assert!(matches!(err, Err(AiError::NotConfigured("GOOGLE_API_KEY"))));
    }

    #[test]
    fn test_parse_embed_response() {
        let body = r#"{"embedding":{"values":[0.25,-0.5]}}"#;
        let parsed: EmbedResponse = serde_json::from_str(body).unwrap_or(EmbedResponse {
            embedding: EmbeddingValues { values: Vec::new() },
        });
        assert_eq!(parsed.embedding.values, vec![0.25, -0.5]);
    }
}
