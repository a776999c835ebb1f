//! Keyword product search.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use luxe_jewel_core::SearchSort;

use crate::db::{ProductRepository, SearchFilters};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::services::catalog::sort_search_results;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<Product>,
    pub count: usize,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_owned)
}

impl SearchQuery {
    /// Database filters, or `None` if no criterion was given.
    ///
    /// A price that does not parse is dropped, but still counts as given.
    fn filters(&self) -> Option<SearchFilters> {
        let text = non_empty(self.q.as_ref());
        let category = non_empty(self.category.as_ref());
        let min_raw = non_empty(self.min_price.as_ref());
        let max_raw = non_empty(self.max_price.as_ref());

        if text.is_none() && category.is_none() && min_raw.is_none() && max_raw.is_none() {
            return None;
        }

        let parse = |raw: Option<String>| raw.and_then(|v| v.parse::<Decimal>().ok());
        Some(SearchFilters {
            text,
            category_slug: category,
            min_price: parse(min_raw),
            max_price: parse(max_raw),
        })
    }
}

/// `GET /api/search?q=&category=&minPrice=&maxPrice=&sortBy=`
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let filters = query.filters().ok_or_else(|| {
        AppError::BadRequest("At least one search parameter is required".to_owned())
    })?;

    let mut results = ProductRepository::new(state.pool()).search(&filters).await?;
    sort_search_results(&mut results, SearchSort::parse_or_default(query.sort_by.as_deref()));

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_require_a_criterion() {
        assert!(SearchQuery::default().filters().is_none());

        let blank = SearchQuery {
            q: Some("  ".to_owned()),
            sort_by: Some("price-low".to_owned()),
            ..SearchQuery::default()
        };
        assert!(blank.filters().is_none());
    }

    #[test]
    fn test_unparsable_price_ignored() {
        let query = SearchQuery {
            min_price: Some("cheap".to_owned()),
            max_price: Some("250.50".to_owned()),
            ..SearchQuery::default()
        };
        let filters = query.filters().unwrap();
        assert_eq!(filters.min_price, None);
        assert_eq!(filters.max_price, Some(Decimal::new(25_050, 2)));
        assert!(filters.text.is_none());
    }
}
