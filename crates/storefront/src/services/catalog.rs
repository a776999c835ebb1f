//! Cached catalog reads and in-memory ordering.
//!
//! Categories and the home page are read on nearly every visit and change
//! only through the back office, so they sit in a `moka` cache (1000 entries,
//! 5 minute TTL). Back-office writes call [`CatalogCache::invalidate_all`].

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, instrument};

use luxe_jewel_core::{ProductSort, SearchSort};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::models::{Category, Product};

/// Featured products shown on the home page.
pub const HOME_FEATURED_LIMIT: i64 = 8;
/// New arrivals shown on the home page.
pub const HOME_NEWEST_LIMIT: i64 = 4;

/// Home page payload.
#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub featured: Vec<Product>,
    pub new_arrivals: Vec<Product>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Categories,
    Home,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Home(Arc<HomePage>),
}

/// Shared cache for catalog reads.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();
        Self { cache }
    }

    /// All categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss whose query fails.
    pub async fn categories(&self, pool: &PgPool) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CategoryRepository::new(pool).list().await?);
        self.cache
            .insert(CacheKey::Categories, CacheValue::Categories(Arc::clone(&categories)))
            .await;
        Ok(categories)
    }

    /// Featured products, new arrivals and categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss whose queries fail.
    #[instrument(skip_all)]
    pub async fn home(&self, pool: &PgPool) -> Result<Arc<HomePage>, RepositoryError> {
        if let Some(CacheValue::Home(home)) = self.cache.get(&CacheKey::Home).await {
            debug!("Cache hit for home page");
            return Ok(home);
        }

        let products = ProductRepository::new(pool);
        let (featured, new_arrivals, categories) = tokio::try_join!(
            products.featured(HOME_FEATURED_LIMIT),
            products.newest(HOME_NEWEST_LIMIT),
            self.categories(pool),
        )?;

        let home = Arc::new(HomePage {
            featured,
            new_arrivals,
            categories: categories.as_ref().clone(),
        });
        self.cache
            .insert(CacheKey::Home, CacheValue::Home(Arc::clone(&home)))
            .await;
        Ok(home)
    }

    /// Drop everything, e.g. after a product or category changes.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

/// Order a `/products` listing.
pub fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::Featured => products.sort_by_key(|p| !p.is_featured),
        ProductSort::Newest => products.sort_by_key(|p| !p.is_new),
        ProductSort::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        ProductSort::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        ProductSort::Rating => products.sort_by(|a, b| b.rating_average.cmp(&a.rating_average)),
    }
}

/// Order `/api/search` results. `Relevance` keeps the database order.
pub fn sort_search_results(products: &mut [Product], sort: SearchSort) {
    let cmp: fn(&Product, &Product) -> Ordering = match sort {
        SearchSort::Relevance => return,
        SearchSort::PriceLow => |a, b| a.price.cmp(&b.price),
        SearchSort::PriceHigh => |a, b| b.price.cmp(&a.price),
        SearchSort::Newest => |a, b| b.id.as_i32().cmp(&a.id.as_i32()),
        SearchSort::Rating => |a, b| b.rating_average.cmp(&a.rating_average),
    };
    products.sort_by(cmp);
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::catalog::fixtures::product;

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    fn catalog() -> Vec<Product> {
        let mut ring = product(1, "Ring", Decimal::new(5_499, 2));
        ring.rating_average = Decimal::new(42, 1);
        let mut necklace = product(2, "Necklace", Decimal::new(4_999, 2));
        necklace.is_featured = true;
        necklace.rating_average = Decimal::new(48, 1);
        let mut studs = product(3, "Studs", Decimal::new(2_499, 2));
        studs.is_new = true;
        studs.rating_average = Decimal::new(39, 1);
        vec![ring, necklace, studs]
    }

    #[test]
    fn test_sort_products() {
        let mut products = catalog();
        sort_products(&mut products, ProductSort::Featured);
        assert_eq!(names(&products), ["Necklace", "Ring", "Studs"]);

        let mut products = catalog();
        sort_products(&mut products, ProductSort::Newest);
        assert_eq!(names(&products), ["Studs", "Ring", "Necklace"]);

        let mut products = catalog();
        sort_products(&mut products, ProductSort::PriceLow);
        assert_eq!(names(&products), ["Studs", "Necklace", "Ring"]);

        let mut products = catalog();
        sort_products(&mut products, ProductSort::PriceHigh);
        assert_eq!(names(&products), ["Ring", "Necklace", "Studs"]);

        let mut products = catalog();
        sort_products(&mut products, ProductSort::Rating);
        assert_eq!(names(&products), ["Necklace", "Ring", "Studs"]);
    }

    #[test]
    fn test_sort_search_results() {
        let mut products = catalog();
        sort_search_results(&mut products, SearchSort::Relevance);
        assert_eq!(names(&products), ["Ring", "Necklace", "Studs"]);

        sort_search_results(&mut products, SearchSort::Newest);
        assert_eq!(names(&products), ["Studs", "Necklace", "Ring"]);

        sort_search_results(&mut products, SearchSort::PriceHigh);
        assert_eq!(names(&products), ["Ring", "Necklace", "Studs"]);
    }
}
