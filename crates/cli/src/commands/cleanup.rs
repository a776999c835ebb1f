//! Trim the catalog back to the curated launch set.
//!
//! ```bash
//! lj-cli cleanup
//! ```
//!
//! Deletes every product outside [`KEEP_PRODUCT_SLUGS`] and the categories in
//! [`REMOVE_CATEGORY_SLUGS`]. Orders keep their line items with the product
//! reference cleared.

use tracing::info;

use luxe_jewel_storefront::db::{CategoryRepository, ProductRepository};

use super::{CliError, connect};

pub const KEEP_PRODUCT_SLUGS: &[&str] = &[
    "gold-chain-necklace",
    "pearl-drop-earrings",
    "silver-bangles-set",
    "sapphire-halo-ring",
];

pub const REMOVE_CATEGORY_SLUGS: &[&str] = &["bangles", "anklets"];

#[derive(Debug, Default)]
pub struct CleanupSummary {
    pub products_removed: u64,
    pub categories_removed: u64,
}

fn owned(slugs: &[&str]) -> Vec<String> {
    slugs.iter().map(|s| (*s).to_owned()).collect()
}

/// # Errors
///
/// Returns an error if the database is unreachable or a delete fails.
pub async fn run() -> Result<CleanupSummary, CliError> {
    let pool = connect().await?;

    info!("Cleaning up extra products...");
    let products_removed = ProductRepository::new(&pool)
        .delete_except(&owned(KEEP_PRODUCT_SLUGS))
        .await?;
    info!("Removed {products_removed} extra products");

    info!("Cleaning up extra categories...");
    let categories_removed = CategoryRepository::new(&pool)
        .delete_slugs(&owned(REMOVE_CATEGORY_SLUGS))
        .await?;
    info!("Removed {categories_removed} extra categories");

    info!("Cleanup complete!");
    Ok(CleanupSummary {
        products_removed,
        categories_removed,
    })
}
