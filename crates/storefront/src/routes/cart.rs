//! Session cart handlers.
//!
//! The cart lives in the visitor's session (see `services::stores`) and is
//! written back after every change. Product snapshots are taken from the
//! catalog when an item is added.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use luxe_jewel_core::{CartItem, ProductId, format_currency};

use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::stores::{CartStore, SessionStorage, StateStorage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartLine {
    pub product_id: ProductId,
}

/// What every cart endpoint returns.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: i64,
    pub subtotal: Decimal,
    pub subtotal_display: String,
}

impl<S: StateStorage> From<&CartStore<S>> for CartView {
    fn from(store: &CartStore<S>) -> Self {
        let subtotal = store.subtotal();
        Self {
            items: store.items().to_vec(),
            item_count: store.item_count(),
            subtotal,
            subtotal_display: format_currency(subtotal),
        }
    }
}

pub(crate) async fn session_cart(session: Session) -> CartStore<SessionStorage> {
    CartStore::load(SessionStorage::new(session)).await
}

/// `GET /cart`
pub async fn show(session: Session) -> Json<CartView> {
    let store = session_cart(session).await;
    Json(CartView::from(&store))
}

/// `POST /cart/add`
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCart>,
) -> Result<Json<CartView>> {
    if body.quantity <= 0 {
        return Err(AppError::BadRequest(
            "Valid product ID and quantity are required".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let mut store = session_cart(session).await;
    store.add_item(product.snapshot(), body.quantity).await;
    add_breadcrumb("cart", "Added to cart", Some(&[("product", product.slug.as_str())]));
    Ok(Json(CartView::from(&store)))
}

/// `POST /cart/update`. A quantity of zero or less removes the line.
pub async fn update(session: Session, Json(body): Json<UpdateCartLine>) -> Json<CartView> {
    let mut store = session_cart(session).await;
    store.update_quantity(body.product_id, body.quantity).await;
    Json(CartView::from(&store))
}

/// `POST /cart/remove`
pub async fn remove(session: Session, Json(body): Json<RemoveCartLine>) -> Json<CartView> {
    let mut store = session_cart(session).await;
    store.remove_item(body.product_id).await;
    Json(CartView::from(&store))
}

/// `POST /cart/clear`
pub async fn clear(session: Session) -> Json<CartView> {
    let mut store = session_cart(session).await;
    store.clear().await;
    Json(CartView::from(&store))
}
