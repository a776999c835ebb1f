//! `/api/recommendations`: "you may also like" for a product page.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use luxe_jewel_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Vector recommendations accept looser matches than text search.
pub const RECOMMENDATION_THRESHOLD: f64 = 0.3;
pub const DEFAULT_COUNT: i32 = 4;
const MAX_COUNT: i32 = 24;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    pub product_id: Option<ProductId>,
    pub count: Option<i32>,
}

impl RecommendationQuery {
    fn count(&self) -> i32 {
        self.count
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_COUNT)
            .min(MAX_COUNT)
    }
}

/// `GET /api/recommendations?productId=&count=4`
///
/// Embedded products get their nearest neighbours; others get products from
/// the same category. Without a product, featured items.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Value>>> {
    let count = query.count();
    let products = ProductRepository::new(state.pool());

    let values = match query.product_id {
        None => to_values(products.featured(i64::from(count)).await?)?,
        Some(id) => match products.get_by_id(id).await? {
            Some(product) if product.has_embedding => {
                to_values(products.similar_to(id, RECOMMENDATION_THRESHOLD, count).await?)?
            }
            Some(product) => match product.category_id {
                Some(category_id) => to_values(
                    products
                        .same_category(category_id, id, i64::from(count))
                        .await?,
                )?,
                None => Vec::new(),
            },
            None => Vec::new(),
        },
    };
    Ok(Json(values))
}

fn to_values<T: serde::Serialize>(rows: Vec<T>) -> Result<Vec<Value>> {
    rows.into_iter()
        .map(|row| serde_json::to_value(row).map_err(AppError::internal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_defaults_and_caps() {
        let query = |count| RecommendationQuery {
            product_id: None,
            count,
        };
        assert_eq!(query(None).count(), 4);
        assert_eq!(query(Some(0)).count(), 4);
        assert_eq!(query(Some(6)).count(), 6);
        assert_eq!(query(Some(500)).count(), MAX_COUNT);
    }
}
