//! `/api/products` and `/api/categories`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{Category, Product};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    pub featured: bool,
    pub category: Option<String>,
}

/// `GET /api/products?featured=true&category=slug`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let products = ProductRepository::new(state.pool())
        .list_active(category, query.featured)
        .await?;
    Ok(Json(products))
}

/// `GET /api/products/{slug}`
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|p| p.is_active)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// `GET /api/categories`
pub async fn categories(State(state): State<AppState>) -> Result<Json<Arc<Vec<Category>>>> {
    let categories = state.catalog().categories(state.pool()).await?;
    Ok(Json(categories))
}
