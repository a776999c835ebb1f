//! Session wishlist handlers. The access guard keeps these to logged-in users.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use luxe_jewel_core::{ProductId, ProductSnapshot};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::services::stores::{SessionStorage, StateStorage, WishlistStore};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub items: Vec<ProductSnapshot>,
    pub item_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub in_wishlist: bool,
    #[serde(flatten)]
    pub wishlist: WishlistView,
}

impl<S: StateStorage> From<&WishlistStore<S>> for WishlistView {
    fn from(store: &WishlistStore<S>) -> Self {
        Self {
            items: store.products().into_iter().cloned().collect(),
            item_count: store.item_count(),
        }
    }
}

async fn session_wishlist(session: Session) -> WishlistStore<SessionStorage> {
    WishlistStore::load(SessionStorage::new(session)).await
}

/// `GET /wishlist`
pub async fn show(session: Session) -> Json<WishlistView> {
    let store = session_wishlist(session).await;
    Json(WishlistView::from(&store))
}

/// `POST /wishlist/toggle`
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<WishlistItemRequest>,
) -> Result<Json<ToggleResponse>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let mut store = session_wishlist(session).await;
    let in_wishlist = store.toggle_item(product.snapshot()).await;
    Ok(Json(ToggleResponse {
        in_wishlist,
        wishlist: WishlistView::from(&store),
    }))
}

/// `POST /wishlist/remove`
pub async fn remove(session: Session, Json(body): Json<WishlistItemRequest>) -> Json<WishlistView> {
    let mut store = session_wishlist(session).await;
    store.remove_item(body.product_id).await;
    Json(WishlistView::from(&store))
}

/// `POST /wishlist/clear`
pub async fn clear(session: Session) -> Json<WishlistView> {
    let mut store = session_wishlist(session).await;
    store.clear().await;
    Json(WishlistView::from(&store))
}
