//! Server-side cart lines (`storefront.shopping_cart`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use luxe_jewel_core::{CartItemId, ProductId, UserId, VariantId};

/// A cart row, owned by a user or an anonymous session id.
///
/// Product columns are only populated by queries that join `products`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartItemId,
    pub user_id: Option<UserId>,
    pub session_id: Option<String>,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
}

/// Who a server cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    User(UserId),
    Session(String),
}
