//! Server-side wishlist rows (`storefront.wishlist`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use luxe_jewel_core::{ProductId, UserId, WishlistItemId};

/// A wishlist row; product columns are filled when the query joins `products`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
}
