//! `/api/wishlist`: saved products for signed-in users.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use luxe_jewel_core::{ProductId, UserId};

use crate::db::WishlistRepository;
use crate::error::{AppError, Result};
use crate::models::WishlistEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistQuery {
    pub user_id: Option<UserId>,
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistBody {
    pub user_id: Option<UserId>,
    pub product_id: Option<ProductId>,
}

/// Membership check for one product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub in_wishlist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<WishlistEntry>,
}

/// `GET /api/wishlist?userId=` lists; adding `&productId=` checks membership.
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<WishlistQuery>,
) -> Result<Json<Value>> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_owned()))?;
    let wishlist = WishlistRepository::new(state.pool());

    if let Some(product_id) = query.product_id {
        let item = wishlist.get(user_id, product_id).await?;
        return Ok(Json(json!(Membership {
            in_wishlist: item.is_some(),
            item,
        })));
    }
    Ok(Json(json!(wishlist.list(user_id).await?)))
}

/// `POST /api/wishlist`. Saving a product twice is a 409.
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<WishlistBody>,
) -> Result<(StatusCode, Json<WishlistEntry>)> {
    let (Some(user_id), Some(product_id)) = (body.user_id, body.product_id) else {
        return Err(AppError::BadRequest(
            "Valid user ID and product ID are required".to_owned(),
        ));
    };

    let entry = WishlistRepository::new(state.pool())
        .add(user_id, product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `DELETE /api/wishlist?userId=&productId=`.
pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<WishlistQuery>,
) -> Result<Json<Value>> {
    let (Some(user_id), Some(product_id)) = (query.user_id, query.product_id) else {
        return Err(AppError::BadRequest(
            "User ID and Product ID are required".to_owned(),
        ));
    };

    WishlistRepository::new(state.pool())
        .remove(user_id, product_id)
        .await?;
    Ok(Json(json!({ "message": "Item removed from wishlist successfully" })))
}
