//! `/api/reviews`. Every write recomputes the product's rating aggregates.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use luxe_jewel_core::{ProductId, ReviewId, UserId};

use crate::db::ReviewRepository;
use crate::error::{AppError, Result};
use crate::models::Review;
use crate::state::AppState;

const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsQuery {
    pub product_id: Option<ProductId>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub product_id: Option<ProductId>,
    pub user_id: Option<UserId>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReview {
    pub id: Option<ReviewId>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<ReviewId>,
}

fn valid_rating(rating: Option<i32>) -> Option<i32> {
    rating.filter(|r| RATING_RANGE.contains(r))
}

/// `GET /api/reviews?productId=` or `?userId=`, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool());
    let rows = match (query.product_id, query.user_id) {
        (Some(product_id), _) => reviews.list_for_product(product_id).await?,
        (None, Some(user_id)) => reviews.list_for_user(user_id).await?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "Product ID or User ID is required".to_owned(),
            ));
        }
    };
    Ok(Json(rows))
}

/// `POST /api/reviews`.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateReview>,
) -> Result<(StatusCode, Json<Review>)> {
    let (Some(product_id), Some(rating)) = (body.product_id, valid_rating(body.rating)) else {
        return Err(AppError::BadRequest(
            "Valid product ID and rating (1-5) are required".to_owned(),
        ));
    };

    let review = ReviewRepository::new(state.pool())
        .create(product_id, body.user_id, rating, body.comment.trim())
        .await?;
    state.catalog().invalidate_all();
    Ok((StatusCode::CREATED, Json(review)))
}

/// `PUT /api/reviews { id, rating, comment? }`.
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<UpdateReview>,
) -> Result<Json<Review>> {
    let (Some(id), Some(rating)) = (body.id, valid_rating(body.rating)) else {
        return Err(AppError::BadRequest(
            "Review ID and valid rating (1-5) are required".to_owned(),
        ));
    };

    let review = ReviewRepository::new(state.pool())
        .update(id, rating, body.comment.as_deref())
        .await?;
    state.catalog().invalidate_all();
    Ok(Json(review))
}

/// `DELETE /api/reviews?id=`.
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>> {
    let id = query
        .id
        .ok_or_else(|| AppError::BadRequest("Review ID is required".to_owned()))?;

    ReviewRepository::new(state.pool()).delete(id).await?;
    state.catalog().invalidate_all();
    Ok(Json(json!({ "message": "Review deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rating_bounds() {
        assert_eq!(valid_rating(Some(1)), Some(1));
        assert_eq!(valid_rating(Some(5)), Some(5));
        assert_eq!(valid_rating(Some(0)), None);
        assert_eq!(valid_rating(Some(6)), None);
        assert_eq!(valid_rating(None), None);
    }
}
