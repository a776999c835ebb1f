//! Seed the catalog from a YAML file.
//!
//! ```bash
//! lj-cli seed --file data/seed.yaml
//! ```
//!
//! Categories and products are upserted by slug, so the command can be re-run
//! after editing the file. Products name their category by slug.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use luxe_jewel_core::CategoryId;
use luxe_jewel_storefront::db::{CategoryRepository, ProductRepository};
use luxe_jewel_storefront::models::ProductInput;

use super::{CliError, connect};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub product: ProductInput,
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
}

/// Every problem in the file, so they can all be fixed in one pass.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    let mut category_slugs = HashSet::new();
    for category in &seed.categories {
        if category.name.trim().is_empty() {
            errors.push(format!("category {}: name is required", category.slug));
        }
        if !category_slugs.insert(category.slug.as_str()) {
            errors.push(format!("category {}: duplicate slug", category.slug));
        }
    }

    let mut product_slugs = HashSet::new();
    for SeedProduct { category, product } in &seed.products {
        if let Err(e) = product.validate() {
            errors.push(format!("product {}: {e}", product.slug));
        }
        if !product_slugs.insert(product.slug.as_str()) {
            errors.push(format!("product {}: duplicate slug", product.slug));
        }
        if let Some(slug) = category
            && !category_slugs.contains(slug.as_str())
        {
            errors.push(format!("product {}: unknown category {slug}", product.slug));
        }
    }

    errors
}

/// Parse and validate a seed file without touching the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or fails validation.
pub async fn load(path: &Path) -> Result<SeedFile, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CliError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }
    Ok(seed)
}

/// Upsert every category, then every product.
///
/// # Errors
///
/// Returns an error if the file is invalid or a database write fails.
pub async fn run(file: &Path) -> Result<SeedSummary, CliError> {
    info!(path = %file.display(), "Loading seed file");
    let seed = load(file).await?;
    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Seed file validated"
    );

    let pool = connect().await?;
    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let mut summary = SeedSummary::default();

    let mut category_ids: HashMap<&str, CategoryId> = HashMap::new();
    for category in &seed.categories {
        let id = categories
            .upsert_by_slug(
                &category.name,
                &category.slug,
                category.description.as_deref(),
                category.image_url.as_deref(),
            )
            .await?;
        category_ids.insert(category.slug.as_str(), id);
        summary.categories += 1;
        info!(slug = %category.slug, %id, "Category seeded");
    }

    for SeedProduct { category, product } in &seed.products {
        let mut input = product.clone();
        input.category_id = category
            .as_deref()
            .and_then(|slug| category_ids.get(slug).copied());
        let id = products.upsert_by_slug(&input).await?;
        summary.products += 1;
        info!(slug = %input.slug, %id, "Product seeded");
    }

    info!("Seeding complete!");
    info!("  Categories: {}", summary.categories);
    info!("  Products: {}", summary.products);
    info!("Run `lj-cli generate-embeddings` to enable AI search for new products");
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const SEED: &str = r"
categories:
  - name: Rings
    slug: rings
  - name: Necklaces
    slug: necklaces
products:
  - name: Sapphire Halo Ring
    slug: sapphire-halo-ring
    category: rings
    price: 599.99
    compare_price: 749.99
    images: [https://example.com/ring.jpg]
    is_featured: true
  - name: Gold Chain Necklace
    slug: gold-chain-necklace
    category: necklaces
    price: '89.50'
    inventory_quantity: 40
";

    #[test]
    fn test_parse_seed_file() {
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(seed.categories.len(), 2);
        assert_eq!(seed.products.len(), 2);

        let ring = &seed.products[0];
        assert_eq!(ring.category.as_deref(), Some("rings"));
        assert!(ring.product.is_featured);
        assert!(ring.product.is_active);
        assert_eq!(ring.product.images.len(), 1);

        let necklace = &seed.products[1].product;
        assert_eq!(necklace.price, Decimal::new(8950, 2));
        assert_eq!(necklace.inventory_quantity, 40);
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let seed: SeedFile = serde_yaml::from_str(
            r"
categories:
  - name: Rings
    slug: rings
products:
  - name: Ring One
    slug: ring-one
    category: bangles
    price: 10
  - name: Ring Two
    slug: ring-one
    price: 12
  - name: ''
    slug: Bad Slug
    price: 5
",
        )
        .unwrap();

        let errors = validate(&seed);
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("unknown category bangles"));
        assert!(errors[1].contains("duplicate slug"));
        assert!(errors[2].contains("name is required"));
    }
}
