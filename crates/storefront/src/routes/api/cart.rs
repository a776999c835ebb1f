//! `/api/cart`: server-side carts keyed by user id or anonymous session id.

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};

use luxe_jewel_core::{CartItemId, ProductId, UserId, VariantId};

use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::models::{CartLine, CartOwner};
use crate::state::AppState;

/// Header carrying the anonymous cart id on `GET`.
pub const SESSION_ID_HEADER: &str = "x-session-id";

const OWNER_REQUIRED: &str = "User ID or Session ID is required";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLine {
    pub product_id: Option<ProductId>,
    #[serde(default = "one")]
    pub quantity: i32,
    pub user_id: Option<UserId>,
    pub session_id: Option<String>,
    pub variant_id: Option<VariantId>,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateLine {
    pub id: Option<CartItemId>,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub id: Option<CartItemId>,
    pub user_id: Option<UserId>,
    pub session_id: Option<String>,
}

/// A user id wins over a session id; blank session ids count as absent.
fn owner(user_id: Option<UserId>, session_id: Option<String>) -> Option<CartOwner> {
    user_id.map(CartOwner::User).or_else(|| {
        session_id
            .filter(|s| !s.trim().is_empty())
            .map(CartOwner::Session)
    })
}

/// `GET /api/cart?userId=` or with an `x-session-id` header.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CartQuery>,
) -> Result<Json<Vec<CartLine>>> {
    let session_id = headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let owner = owner(query.user_id, session_id)
        .ok_or_else(|| AppError::BadRequest(OWNER_REQUIRED.to_owned()))?;

    let lines = CartRepository::new(state.pool()).list(&owner).await?;
    Ok(Json(lines))
}

/// `POST /api/cart`. Adding a product already in the cart increases its quantity.
pub async fn add(State(state): State<AppState>, Json(body): Json<AddLine>) -> Result<Json<CartLine>> {
    let product_id = body
        .product_id
        .and_then(ProductId::positive)
        .filter(|_| body.quantity > 0)
        .ok_or_else(|| {
            AppError::BadRequest("Valid product ID and quantity are required".to_owned())
        })?;
    let owner = owner(body.user_id, body.session_id)
        .ok_or_else(|| AppError::BadRequest(OWNER_REQUIRED.to_owned()))?;

    let line = CartRepository::new(state.pool())
        .add(&owner, product_id, body.variant_id, body.quantity)
        .await?;
    Ok(Json(line))
}

/// `PUT /api/cart`. A quantity of zero removes the line.
pub async fn update(State(state): State<AppState>, Json(body): Json<UpdateLine>) -> Result<Json<Value>> {
    let id = body
        .id
        .and_then(CartItemId::positive)
        .filter(|_| body.quantity >= 0)
        .ok_or_else(|| {
            AppError::BadRequest("Valid cart item ID and quantity are required".to_owned())
        })?;

    let carts = CartRepository::new(state.pool());
    if body.quantity == 0 {
        carts.remove(id).await?;
        return Ok(Json(json!({ "message": "Item removed" })));
    }
    let line = carts.update_quantity(id, body.quantity).await?;
    Ok(Json(json!(line)))
}

/// `DELETE /api/cart?id=` removes one line; `?userId=` or `?sessionId=` clears a cart.
pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>> {
    let carts = CartRepository::new(state.pool());
    if let Some(id) = query.id {
        carts.remove(id).await?;
    } else if let Some(owner) = owner(query.user_id, query.session_id) {
        carts.clear(&owner).await?;
    } else {
        return Err(AppError::BadRequest(
            "ID, User ID, or Session ID is required".to_owned(),
        ));
    }
    Ok(Json(json!({ "message": "Cart cleared or item removed" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_resolution() {
        assert_eq!(
            owner(Some(UserId::new(3)), Some("anon-1".to_owned())),
            Some(CartOwner::User(UserId::new(3)))
        );
        assert_eq!(
            owner(None, Some("anon-1".to_owned())),
            Some(CartOwner::Session("anon-1".to_owned()))
        );
        assert_eq!(owner(None, Some(" ".to_owned())), None);
        assert_eq!(owner(None, None), None);
    }
}
