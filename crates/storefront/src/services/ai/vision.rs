//! Jewelry image description through a chain of chat models.
//!
//! Providers are tried in order Groq, Cerebras, OpenRouter, Gemini; within a
//! provider, models are tried in listed order. The first model whose reply
//! parses as `{"category", "description"}` wins.

use std::future::Future;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use super::retry::{RetryPolicy, with_quota_retry};
use super::{AiError, api_error_message};
use crate::config::AiConfig;

/// Instructions sent with every image.
pub const VISION_PROMPT: &str = r#"You are a professional jewelry appraiser. Analyze this jewelry image for an AI search.
Identify the primary category (must be one of: rings, necklaces, earrings, bracelets).
Provide a highly descriptive search string including:
- Metal/Material (Gold, Silver, Platinum, etc.)
- Stones/Gems (Diamond, Pearl, Emerald, Sapphire, Crystal, CZ, etc.)
- Style (Bohemian, Minimalist, Traditional, Modern, Vintage, etc.)
- Key visual features (Dangle, Stud, Hoop, Choker, Filigree, Locket, etc.)
Return ONLY a JSON object: {"category": "category_name", "description": "detailed professional description"}"#;

const TEXT_ONLY_SUFFIX: &str = " (Analyze the jewelry description from the provided image context)";

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const CEREBRAS_ENDPOINT: &str = "https://api.cerebras.ai/v1/chat/completions";
const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const GROQ_MODELS: &[&str] = &[
    "meta-llama/llama-4-scout-17b-16e-instruct",
    "meta-llama/llama-4-maverick-17b-128e-instruct",
    "llama-3.2-11b-vision-preview",
    "llama-3.2-90b-vision-preview",
];
const CEREBRAS_MODELS: &[&str] = &["llama3.2-11b-vision", "llama-3.3-70b"];
const OPENROUTER_MODELS: &[&str] = &[
    "google/gemini-2.0-flash-lite-preview-02-05:free",
    "google/gemini-flash-1.5-8b",
    "openai/gpt-4o-mini",
];
const GEMINI_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// What a vision model saw.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageDescription {
    #[serde(default)]
    pub category: String,
    pub description: String,
}

/// Describes a base64 JPEG.
pub trait VisionModel: Send + Sync {
    /// `provider/model`, for logs.
    fn label(&self) -> String;

    fn describe(
        &self,
        image_base64: &str,
    ) -> impl Future<Output = Result<ImageDescription, AiError>> + Send;
}

/// Wire protocol a model speaks.
#[derive(Debug, Clone)]
pub enum ProviderKind {
    /// `/chat/completions` with `image_url` content parts.
    OpenAiCompatible {
        endpoint: &'static str,
        extra_headers: Vec<(&'static str, &'static str)>,
    },
    /// Gemini `generateContent` with `inlineData`.
    Gemini { base_url: String },
}

/// One model at one provider.
#[derive(Clone)]
pub struct ChatModel {
    http: reqwest::Client,
    provider: &'static str,
    kind: ProviderKind,
    model: String,
    api_key: SecretString,
    supports_images: bool,
    retry: Option<RetryPolicy>,
}

impl ChatModel {
    fn new(
        http: &reqwest::Client,
        provider: &'static str,
        kind: ProviderKind,
        model: &str,
        api_key: &SecretString,
        supports_images: bool,
    ) -> Self {
        Self {
            http: http.clone(),
            provider,
            kind,
            model: model.to_owned(),
            api_key: api_key.clone(),
            supports_images,
            retry: None,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub const fn supports_images(&self) -> bool {
        self.supports_images
    }

    async fn chat_completion(
        &self,
        endpoint: &str,
        extra_headers: &[(&'static str, &'static str)],
        image_base64: &str,
    ) -> Result<String, AiError> {
        let content = if self.supports_images {
            json!([
                { "type": "text", "text": VISION_PROMPT },
                { "type": "image_url", "image_url": { "url": format!("data:image/jpeg;base64,{image_base64}") } }
            ])
        } else {
            Value::String(format!("{VISION_PROMPT}{TEXT_ONLY_SUFFIX}"))
        };
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": content }],
            "response_format": { "type": "json_object" },
        });

        let mut request = self
            .http
            .post(endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(REQUEST_TIMEOUT)
            .json(&payload);
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AiError::Api {
                provider: self.provider,
                status: status.as_u16(),
                message: api_error_message(&body, status.canonical_reason().unwrap_or("error")),
            });
        }

        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| AiError::InvalidResponse("no message content".to_owned()))
    }

    async fn generate_content(&self, base_url: &str, image_base64: &str) -> Result<String, AiError> {
        let url = format!("{base_url}/v1beta/models/{}:generateContent", self.model);
        let payload = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "data": image_base64, "mimeType": "image/jpeg" } },
                    { "text": VISION_PROMPT }
                ]
            }]
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AiError::Api {
                provider: self.provider,
                status: status.as_u16(),
                message: api_error_message(&body, status.canonical_reason().unwrap_or("error")),
            });
        }

        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| AiError::InvalidResponse("no candidate text".to_owned()))
    }

    async fn describe_once(&self, image_base64: &str) -> Result<ImageDescription, AiError> {
        let raw = match &self.kind {
            ProviderKind::OpenAiCompatible {
                endpoint,
                extra_headers,
            } => self.chat_completion(endpoint, extra_headers, image_base64).await?,
            ProviderKind::Gemini { base_url } => {
                self.generate_content(base_url, image_base64).await?
            }
        };
        parse_description(&raw)
    }
}

impl VisionModel for ChatModel {
    fn label(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }

    #[instrument(skip_all, fields(model = %self.label()))]
    async fn describe(&self, image_base64: &str) -> Result<ImageDescription, AiError> {
        match &self.retry {
            Some(policy) => with_quota_retry(policy, || self.describe_once(image_base64)).await,
            None => self.describe_once(image_base64).await,
        }
    }
}

/// Ordered list of models to try.
pub struct VisionChain<M = ChatModel> {
    models: Vec<M>,
}

impl VisionChain<ChatModel> {
    /// Build the chain from whichever provider keys are configured.
    #[must_use]
    pub fn from_config(config: &AiConfig, http: &reqwest::Client) -> Self {
        let mut models = Vec::new();

        if let Some(key) = &config.groq_api_key {
            let kind = ProviderKind::OpenAiCompatible {
                endpoint: GROQ_ENDPOINT,
                extra_headers: Vec::new(),
            };
            models.extend(GROQ_MODELS.iter().map(|m| {
                let vision = m.contains("vision") || m.contains("scout") || m.contains("maverick");
                ChatModel::new(http, "Groq", kind.clone(), m, key, vision)
            }));
        }

        if let Some(key) = &config.cerebras_api_key {
            let kind = ProviderKind::OpenAiCompatible {
                endpoint: CEREBRAS_ENDPOINT,
                extra_headers: Vec::new(),
            };
            models.extend(CEREBRAS_MODELS.iter().map(|m| {
                ChatModel::new(http, "Cerebras", kind.clone(), m, key, m.contains("vision"))
            }));
        }

        if let Some(key) = &config.openrouter_api_key {
            let kind = ProviderKind::OpenAiCompatible {
                endpoint: OPENROUTER_ENDPOINT,
                extra_headers: vec![
                    ("HTTP-Referer", "https://luxejewel.vercel.app"),
                    ("X-Title", "LuxeJewel AI Search"),
                ],
            };
            models.extend(
                OPENROUTER_MODELS
                    .iter()
                    .map(|m| ChatModel::new(http, "OpenRouter", kind.clone(), m, key, true)),
            );
        }

        if let Some(key) = &config.google_api_key {
            let kind = ProviderKind::Gemini {
                base_url: GEMINI_BASE_URL.to_owned(),
            };
            models.extend(GEMINI_MODELS.iter().map(|m| {
                let mut model = ChatModel::new(http, "Gemini", kind.clone(), m, key, true);
                model.retry = Some(RetryPolicy::default());
                model
            }));
        }

        Self { models }
    }
}

impl<M: VisionModel> VisionChain<M> {
    #[must_use]
    pub const fn new(models: Vec<M>) -> Self {
        Self { models }
    }

    #[must_use]
    pub fn models(&self) -> &[M] {
        &self.models
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Ask each model in turn until one returns a usable description.
    ///
    /// # Errors
    ///
    /// Returns `AiError::AllModelsFailed` when every model errors or the chain is empty.
    pub async fn describe_image(&self, image: &str) -> Result<ImageDescription, AiError> {
        let image_base64 = strip_data_url(image);
        for model in &self.models {
            match model.describe(image_base64).await {
                Ok(found) if !found.description.trim().is_empty() => {
                    info!(model = %model.label(), category = %found.category, "Image described");
                    return Ok(found);
                }
                Ok(_) => warn!(model = %model.label(), "Empty description"),
                Err(e) => warn!(model = %model.label(), error = %e, "Vision model failed"),
            }
        }
        Err(AiError::AllModelsFailed)
    }
}

/// `data:image/jpeg;base64,AAAA` → `AAAA`; bare base64 passes through.
#[must_use]
pub fn strip_data_url(image: &str) -> &str {
    image.split_once(',').map_or(image, |(_, data)| data)
}

/// The base64 payload of an uploaded image, if it decodes to something.
#[must_use]
pub fn image_payload(image: &str) -> Option<&str> {
    let data = strip_data_url(image).trim();
    BASE64
        .decode(data)
        .ok()
        .filter(|bytes| !bytes.is_empty())
        .map(|_| data)
}

/// Remove Markdown code fences a model may wrap its JSON in.
#[must_use]
pub fn strip_code_fences(content: &str) -> String {
    content.replace("```json", "").replace("```", "").trim().to_owned()
}

/// Parse a model reply into an [`ImageDescription`].
///
/// # Errors
///
/// Returns `AiError::InvalidResponse` if the reply is not the expected JSON object.
pub fn parse_description(content: &str) -> Result<ImageDescription, AiError> {
    serde_json::from_str(&strip_code_fences(content))
        .map_err(|e| AiError::InvalidResponse(format!("unparsable description: {e}")))
}
