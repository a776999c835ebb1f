//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::ai::{GeminiEmbeddingClient, VisionChain};
use crate::services::catalog::CatalogCache;
use crate::services::payment::MockPaymentProvider;

/// Outbound requests to AI and OAuth providers give up after this long.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Error building the outbound HTTP client.
#[derive(Debug, thiserror::Error)]
#[error("failed to build HTTP client: {0}")]
pub struct StateError(#[from] reqwest::Error);

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    http: reqwest::Client,
    catalog: CatalogCache,
    embedder: GeminiEmbeddingClient,
    vision: VisionChain,
    payments: MockPaymentProvider,
}

impl AppState {
    /// Build state from configuration and a database pool.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("luxe-jewel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let embedder = GeminiEmbeddingClient::new(http.clone(), config.ai.google_api_key.clone());
        let vision = VisionChain::from_config(&config.ai, &http);
        let payments = MockPaymentProvider::new(config.payment);

        if !embedder.is_configured() {
            tracing::warn!("GOOGLE_API_KEY not set; AI search will use keyword fallback");
        }
        tracing::info!(models = vision.models().len(), "Vision model chain ready");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                http,
                catalog: CatalogCache::new(),
                embedder,
                vision,
                payments,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Shared client for outbound HTTP (AI providers, OAuth).
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }

    #[must_use]
    pub fn embedder(&self) -> &GeminiEmbeddingClient {
        &self.inner.embedder
    }

    #[must_use]
    pub fn vision(&self) -> &VisionChain {
        &self.inner.vision
    }

    #[must_use]
    pub fn payments(&self) -> &MockPaymentProvider {
        &self.inner.payments
    }
}
