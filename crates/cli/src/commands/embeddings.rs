//! Generate product embeddings for AI search.
//!
//! ```bash
//! lj-cli generate-embeddings          # products without an embedding
//! lj-cli generate-embeddings --force  # every active product
//! ```
//!
//! Requires `GOOGLE_API_KEY`. One product per second; a quota error adds a
//! ten second cooldown before the next product.

use std::time::Duration;

use secrecy::SecretString;
use tracing::{error, info, warn};

use luxe_jewel_storefront::db::{EmbeddingSource, ProductRepository};
use luxe_jewel_storefront::services::ai::{
    EMBEDDING_DIMENSIONS, GeminiEmbeddingClient, TextEmbedder,
};

use super::{CliError, connect};

const PACING: Duration = Duration::from_secs(1);
const QUOTA_COOLDOWN: Duration = Duration::from_secs(10);

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EmbeddingSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

/// The text embedded for a product. Missing descriptions embed as empty.
#[must_use]
pub fn embedding_text(source: &EmbeddingSource) -> String {
    format!(
        "Product: {}. Summary: {}. Details: {}",
        source.name,
        source.short_description.as_deref().unwrap_or_default(),
        source.description.as_deref().unwrap_or_default(),
    )
}

/// Embed products and store the vectors.
///
/// # Errors
///
/// Returns an error if configuration is missing or products cannot be listed.
/// Individual product failures are counted, not returned.
pub async fn run(force: bool) -> Result<EmbeddingSummary, CliError> {
    let pool = connect().await?;
    let api_key = std::env::var("GOOGLE_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from)
        .ok_or(CliError::MissingEnvVar("GOOGLE_API_KEY"))?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let embedder = GeminiEmbeddingClient::new(http, Some(api_key));
    let products = ProductRepository::new(&pool);

    let sources = products.embedding_sources(force).await?;
    if sources.is_empty() {
        info!("All products already have embeddings!");
        return Ok(EmbeddingSummary::default());
    }
    info!(count = sources.len(), force, "Products to process");

    let mut summary = EmbeddingSummary {
        total: sources.len(),
        ..EmbeddingSummary::default()
    };

    for (i, source) in sources.iter().enumerate() {
        info!("[{}/{}] Processing: {}", i + 1, summary.total, source.name);

        match embedder.embed(&embedding_text(source)).await {
            Ok(embedding) => match products.set_embedding(source.id, &embedding).await {
                Ok(()) => {
                    info!(dimensions = EMBEDDING_DIMENSIONS, "Stored embedding");
                    summary.succeeded += 1;
                }
                Err(e) => {
                    error!(product = %source.id, error = %e, "Database update failed");
                    summary.failed += 1;
                }
            },
            Err(e) => {
                error!(product = %source.id, error = %e, "Embedding failed");
                summary.failed += 1;
                if e.is_quota() {
                    warn!("Rate limit hit, cooling down for 10s...");
                    tokio::time::sleep(QUOTA_COOLDOWN).await;
                }
            }
        }

        if i + 1 < summary.total {
            tokio::time::sleep(PACING).await;
        }
    }

    info!("Result summary:");
    info!("  Success: {}", summary.succeeded);
    info!("  Failed:  {}", summary.failed);
    info!("  Total:   {}", summary.total);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use luxe_jewel_core::ProductId;

    use super::*;

    #[test]
    fn test_embedding_text() {
        let source = EmbeddingSource {
            id: ProductId::new(1),
            name: "Pearl Drop Earrings".to_owned(),
            short_description: Some("Freshwater pearls.".to_owned()),
            description: None,
        };
        assert_eq!(
            embedding_text(&source),
            "Product: Pearl Drop Earrings. Summary: Freshwater pearls.. Details: "
        );
    }
}
