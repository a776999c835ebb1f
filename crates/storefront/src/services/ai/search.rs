//! `/api/search/ai` orchestration.
//!
//! Text queries are embedded and matched at similarity 0.5; if embedding
//! fails the search degrades to a keyword match. Images are described by the
//! vision chain, the description is embedded, and matching runs at 0.3
//! within the detected category.

use std::future::Future;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use luxe_jewel_core::CategoryId;

use super::embeddings::TextEmbedder;
use super::retry::{RetryPolicy, with_quota_retry};
use super::vision::{VisionChain, VisionModel, image_payload};
use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::models::{Product, ProductMatch};

/// Minimum cosine similarity for text queries.
pub const TEXT_MATCH_THRESHOLD: f64 = 0.5;
/// Minimum cosine similarity for image descriptions.
pub const IMAGE_MATCH_THRESHOLD: f64 = 0.3;
/// Results per AI search.
pub const MATCH_COUNT: i32 = 8;

/// Request body. Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiSearchRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl AiSearchRequest {
    fn query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.is_empty())
    }
}

/// A successful search.
#[derive(Debug)]
pub enum AiSearchOutcome {
    /// Vector matches, with the category the vision model detected (empty for text).
    Matches {
        results: Vec<ProductMatch>,
        category: String,
    },
    /// Keyword matches served while embeddings were unavailable.
    Fallback { results: Vec<Product> },
}

#[derive(Debug, Error)]
pub enum AiSearchError {
    #[error("Image or query text is required")]
    MissingInput,

    #[error("Image must be base64 encoded")]
    InvalidImage,

    /// The image path failed: no model could describe it, or the description
    /// could not be embedded.
    #[error("AI search failed: {0}")]
    Vision(String),

    /// Anything else, including the keyword fallback failing.
    #[error("Failed to process AI search: {0}")]
    Failed(String),
}

/// Where matches come from.
pub trait ProductIndex: Send + Sync {
    fn match_embedding(
        &self,
        embedding: &[f32],
        threshold: f64,
        count: i32,
        category: Option<CategoryId>,
    ) -> impl Future<Output = Result<Vec<ProductMatch>, RepositoryError>> + Send;

    fn keyword_fallback(
        &self,
        text: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    fn category_id(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<CategoryId>, RepositoryError>> + Send;
}

impl ProductIndex for PgPool {
    async fn match_embedding(
        &self,
        embedding: &[f32],
        threshold: f64,
        count: i32,
        category: Option<CategoryId>,
    ) -> Result<Vec<ProductMatch>, RepositoryError> {
        ProductRepository::new(self)
            .match_embedding(embedding, threshold, count, category)
            .await
    }

    async fn keyword_fallback(&self, text: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(self).keyword_fallback(text, limit).await
    }

    async fn category_id(&self, slug: &str) -> Result<Option<CategoryId>, RepositoryError> {
        CategoryRepository::new(self).id_for_slug(slug).await
    }
}

/// The AI search pipeline over its three collaborators.
pub struct AiSearch<'a, E, V, I> {
    embedder: &'a E,
    vision: &'a VisionChain<V>,
    index: &'a I,
    retry: RetryPolicy,
}

impl<'a, E, V, I> AiSearch<'a, E, V, I>
where
    E: TextEmbedder,
    V: VisionModel,
    I: ProductIndex,
{
    #[must_use]
    pub fn new(embedder: &'a E, vision: &'a VisionChain<V>, index: &'a I) -> Self {
        Self {
            embedder,
            vision,
            index,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run a search. A text query takes precedence over an image.
    ///
    /// # Errors
    ///
    /// See [`AiSearchError`].
    #[instrument(skip_all, fields(has_image = request.image().is_some(), has_query = request.query().is_some()))]
    pub async fn run(&self, request: &AiSearchRequest) -> Result<AiSearchOutcome, AiSearchError> {
        if let Some(query) = request.query() {
            return self.search_text(query).await;
        }
        if let Some(image) = request.image() {
            return self.search_image(image).await;
        }
        Err(AiSearchError::MissingInput)
    }

    async fn search_text(&self, query: &str) -> Result<AiSearchOutcome, AiSearchError> {
        let embedding = match with_quota_retry(&self.retry, || self.embedder.embed(query)).await {
            Ok(embedding) => embedding,
            Err(embed_error) => {
                warn!(error = %embed_error, "Embedding failed, falling back to keyword search");
                return match self.index.keyword_fallback(query, i64::from(MATCH_COUNT)).await {
                    Ok(results) => Ok(AiSearchOutcome::Fallback { results }),
                    Err(db_error) => {
                        warn!(error = %db_error, "Keyword fallback failed");
                        Err(AiSearchError::Failed(embed_error.to_string()))
                    }
                };
            }
        };

        let results = self
            .index
            .match_embedding(&embedding, TEXT_MATCH_THRESHOLD, MATCH_COUNT, None)
            .await
            .map_err(|e| AiSearchError::Failed(e.to_string()))?;

        info!(count = results.len(), "Text AI search");
        Ok(AiSearchOutcome::Matches {
            results,
            category: String::new(),
        })
    }

    async fn search_image(&self, image: &str) -> Result<AiSearchOutcome, AiSearchError> {
        let payload = image_payload(image).ok_or(AiSearchError::InvalidImage)?;
        let described = self
            .vision
            .describe_image(payload)
            .await
            .map_err(|e| AiSearchError::Vision(e.to_string()))?;

        let category_id = if described.category.trim().is_empty() {
            None
        } else {
            let slug = described.category.trim().to_lowercase();
            match self.index.category_id(&slug).await {
                Ok(id) => id,
                Err(e) => {
                    warn!(error = %e, %slug, "Category lookup failed");
                    None
                }
            }
        };

        let embedding = with_quota_retry(&self.retry, || self.embedder.embed(&described.description))
            .await
            .map_err(|e| AiSearchError::Vision(e.to_string()))?;

        let results = self
            .index
            .match_embedding(&embedding, IMAGE_MATCH_THRESHOLD, MATCH_COUNT, category_id)
            .await
            .map_err(|e| AiSearchError::Failed(e.to_string()))?;

        info!(count = results.len(), category = %described.category, "Image AI search");
        Ok(AiSearchOutcome::Matches {
            results,
            category: described.category,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use super::*;
    use crate::models::catalog::fixtures::product;
    use crate::services::ai::vision::{ImageDescription, parse_description};
    use crate::services::ai::AiError;

    struct FakeEmbedder {
        fail_with: Option<u16>,
    }

    impl TextEmbedder for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, AiError> {
            match self.fail_with {
                Some(status) => Err(AiError::Api {
                    provider: "Gemini",
                    status,
                    message: "Embedding API error: quota".to_owned(),
                }),
                None => Ok(vec![0.1; 768]),
            }
        }
    }

    struct FakeVision(Option<&'static str>);

    impl VisionModel for FakeVision {
        fn label(&self) -> String {
            "fake".to_owned()
        }

        async fn describe(&self, _image: &str) -> Result<ImageDescription, AiError> {
            self.0
                .map_or(Err(AiError::InvalidResponse("nope".to_owned())), parse_description)
        }
    }

    #[derive(Default)]
    struct FakeIndex {
        fail_keyword: bool,
        matches: Mutex<Vec<(f64, i32, Option<CategoryId>)>>,
    }

    impl ProductIndex for FakeIndex {
        async fn match_embedding(
            &self,
            _embedding: &[f32],
            threshold: f64,
            count: i32,
            category: Option<CategoryId>,
        ) -> Result<Vec<ProductMatch>, RepositoryError> {
            self.matches.lock().unwrap().push((threshold, count, category));
            Ok(vec![ProductMatch {
                product: product(1, "Sapphire Halo Ring", Decimal::new(59_999, 2)),
                similarity: 0.82,
            }])
        }

        async fn keyword_fallback(&self, text: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
            if self.fail_keyword {
                return Err(RepositoryError::NotFound);
            }
            assert_eq!(limit, 8);
            Ok(vec![product(2, text, Decimal::new(4_999, 2))])
        }

        async fn category_id(&self, slug: &str) -> Result<Option<CategoryId>, RepositoryError> {
            Ok((slug == "rings").then(|| CategoryId::new(1)))
        }
    }

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_retries: 1,
            initial_delay: Duration::from_millis(1),
            multiplier: 2.0,
        }
    }

    fn text(q: &str) -> AiSearchRequest {
        AiSearchRequest {
            image: None,
            query: Some(q.to_owned()),
        }
    }

    fn image() -> AiSearchRequest {
        AiSearchRequest {
            image: Some("data:image/jpeg;base64,QUJD".to_owned()),
            query: None,
        }
    }

    #[tokio::test]
    async fn test_missing_input() {
        let embedder = FakeEmbedder { fail_with: None };
        let vision = VisionChain::new(vec![FakeVision(None)]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index);

        let blank = AiSearchRequest {
            image: Some(String::new()),
            query: Some("   ".to_owned()),
        };
        assert!(matches!(search.run(&blank).await, Err(AiSearchError::MissingInput)));
    }

    #[tokio::test]
    async fn test_text_search_uses_text_threshold() {
        let embedder = FakeEmbedder { fail_with: None };
        let vision = VisionChain::new(vec![FakeVision(None)]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index);

        let outcome = search.run(&text("gold ring")).await.unwrap();
        let AiSearchOutcome::Matches { results, category } = outcome else {
            panic!("expected vector matches");
        };
        assert_eq!(results.len(), 1);
        assert!(category.is_empty());
        assert_eq!(index.matches.lock().unwrap().as_slice(), [(0.5, 8, None)]);
    }

    #[tokio::test]
    async fn test_text_search_falls_back_to_keywords() {
        let embedder = FakeEmbedder { fail_with: Some(429) };
        let vision = VisionChain::new(vec![FakeVision(None)]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index).with_retry(fast());

        let outcome = search.run(&text("pearl")).await.unwrap();
        let AiSearchOutcome::Fallback { results } = outcome else {
            panic!("expected keyword fallback");
        };
        assert_eq!(results[0].name, "pearl");
        assert!(index.matches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_failure_reports_embedding_error() {
        let embedder = FakeEmbedder { fail_with: Some(500) };
        let vision = VisionChain::new(vec![FakeVision(None)]);
        let index = FakeIndex {
            fail_keyword: true,
            ..FakeIndex::default()
        };
        let search = AiSearch::new(&embedder, &vision, &index).with_retry(fast());

        let err = search.run(&text("pearl")).await.unwrap_err();
        let AiSearchError::Failed(details) = err else {
            panic!("expected Failed");
        };
        assert!(details.contains("Embedding API error"));
    }

    #[tokio::test]
    async fn test_image_search_maps_category() {
        let embedder = FakeEmbedder { fail_with: None };
        let vision = VisionChain::new(vec![
            FakeVision(None),
            FakeVision(Some(r#"{"category":"Rings","description":"Silver ring with blue sapphire"}"#)),
        ]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index);

        let outcome = search.run(&image()).await.unwrap();
        let AiSearchOutcome::Matches { category, .. } = outcome else {
            panic!("expected vector matches");
        };
        assert_eq!(category, "Rings");
        assert_eq!(
            index.matches.lock().unwrap().as_slice(),
            [(0.3, 8, Some(CategoryId::new(1)))]
        );
    }

    #[tokio::test]
    async fn test_image_search_unknown_category_is_unfiltered() {
        let embedder = FakeEmbedder { fail_with: None };
        let vision = VisionChain::new(vec![FakeVision(Some(
            r#"{"category":"brooches","description":"Art deco brooch"}"#,
        ))]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index);

        search.run(&image()).await.unwrap();
        assert_eq!(index.matches.lock().unwrap().as_slice(), [(0.3, 8, None)]);
    }

    #[tokio::test]
    async fn test_image_search_all_models_failed() {
        let embedder = FakeEmbedder { fail_with: None };
        let vision = VisionChain::new(vec![FakeVision(None), FakeVision(None)]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index);

        let err = search.run(&image()).await.unwrap_err();
        let AiSearchError::Vision(details) = err else {
            panic!("expected Vision");
        };
        assert_eq!(details, "All AI vision models failed");
    }

    #[tokio::test]
    async fn test_undecodable_image_is_rejected_before_vision() {
        let embedder = FakeEmbedder { fail_with: None };
        let vision = VisionChain::new(vec![FakeVision(Some(
            r#"{"category":"rings","description":"Gold band"}"#,
        ))]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index);

        let garbage = AiSearchRequest {
            image: Some("data:image/jpeg;base64,%%%".to_owned()),
            query: None,
        };
        assert!(matches!(search.run(&garbage).await, Err(AiSearchError::InvalidImage)));
        assert!(index.matches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_wins_over_image() {
        let embedder = FakeEmbedder { fail_with: None };
        let vision = VisionChain::new(vec![FakeVision(None)]);
        let index = FakeIndex::default();
        let search = AiSearch::new(&embedder, &vision, &index);

        let both = AiSearchRequest {
            image: Some("QUJD".to_owned()),
            query: Some("bracelet".to_owned()),
        };
        assert!(matches!(
            search.run(&both).await,
            Ok(AiSearchOutcome::Matches { .. })
        ));
    }
}
