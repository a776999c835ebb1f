//! Catalog handlers: home page, product listing and product detail.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use luxe_jewel_core::ProductSort;

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::models::{Product, Review};
use crate::services::catalog::{HomePage, sort_products};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub sort: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub count: usize,
    pub sort: ProductSort,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub discount_percentage: Option<u32>,
    pub reviews: Vec<Review>,
}

/// `GET /`
pub async fn home(State(state): State<AppState>) -> Result<Json<Arc<HomePage>>> {
    let home = state.catalog().home(state.pool()).await?;
    Ok(Json(home))
}

/// `GET /products?sort=&category=`
///
/// Unknown sort names fall back to `featured`.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ProductListing>> {
    let sort = ProductSort::parse_or_default(query.sort.as_deref());
    let category = query.category.as_deref().filter(|c| !c.is_empty());

    let mut products = ProductRepository::new(state.pool())
        .list_active(category, false)
        .await?;
    sort_products(&mut products, sort);

    Ok(Json(ProductListing {
        count: products.len(),
        products,
        sort,
    }))
}

/// `GET /products/{slug}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_slug(&slug)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    if let Err(e) = products.increment_view_count(product.id).await {
        warn!(error = %e, product_id = %product.id, "Failed to record product view");
    }

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product.id)
        .await?;

    Ok(Json(ProductDetail {
        discount_percentage: product.discount_percentage(),
        product,
        reviews,
    }))
}
