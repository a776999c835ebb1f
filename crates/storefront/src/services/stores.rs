//! Client-persisted cart and wishlist stores.
//!
//! The whole state is written back after every mutation, and rehydrated on
//! [`CartStore::load`] / [`WishlistStore::load`]. Storage is best effort:
//! unreadable data yields an empty store and failed writes are only logged.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_sessions::Session;
use tracing::warn;

use luxe_jewel_core::{Cart, CartItem, ProductId, ProductSnapshot, Wishlist};

use crate::models::session_keys;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A string key-value store the client state is mirrored to.
pub trait StateStorage: Send + Sync {
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn save(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Storage backed by the visitor's session.
#[derive(Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl StateStorage for SessionStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn save(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.session.insert(key, value).await?;
        Ok(())
    }
}

/// In-process storage, shared between clones.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.to_owned(), value);
        Ok(())
    }
}

async fn read_json<S, T>(storage: &S, key: &str) -> Option<T>
where
    S: StateStorage,
    T: serde::de::DeserializeOwned,
{
    let raw = match storage.load(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Discarding corrupt stored state");
            None
        }
    }
}

async fn write_json<S, T>(storage: &S, key: &str, value: &T)
where
    S: StateStorage,
    T: serde::Serialize + Sync,
{
    let result = match serde_json::to_string(value) {
        Ok(raw) => storage.save(key, raw).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        warn!(key, error = %e, "Failed to persist state");
    }
}

/// A [`Cart`] mirrored to storage under `luxejewel-cart`.
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
}

impl<S: StateStorage> CartStore<S> {
    /// Rehydrate from storage.
    pub async fn load(storage: S) -> Self {
        let cart = read_json(&storage, session_keys::CART)
            .await
            .unwrap_or_default();
        Self { storage, cart }
    }

    pub async fn add_item(&mut self, product: ProductSnapshot, quantity: i32) {
        self.cart.add_item(product, quantity);
        self.persist().await;
    }

    pub async fn remove_item(&mut self, product_id: ProductId) {
        self.cart.remove_item(product_id);
        self.persist().await;
    }

    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: i32) {
        self.cart.update_quantity(product_id, quantity);
        self.persist().await;
    }

    pub async fn clear(&mut self) {
        self.cart.clear();
        self.persist().await;
    }

    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart.subtotal()
    }

    #[must_use]
    pub fn is_in_cart(&self, product_id: ProductId) -> bool {
        self.cart.contains(product_id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    async fn persist(&self) {
        write_json(&self.storage, session_keys::CART, &self.cart).await;
    }
}

/// A [`Wishlist`] mirrored to storage: ids under `luxejewel-wishlist`,
/// snapshots under `luxejewel-wishlist_products`.
pub struct WishlistStore<S> {
    storage: S,
    wishlist: Wishlist,
}

impl<S: StateStorage> WishlistStore<S> {
    /// Rehydrate from storage.
    pub async fn load(storage: S) -> Self {
        let ids: Vec<ProductId> = read_json(&storage, session_keys::WISHLIST)
            .await
            .unwrap_or_default();
        let products: HashMap<ProductId, ProductSnapshot> =
            read_json(&storage, session_keys::WISHLIST_PRODUCTS)
                .await
                .unwrap_or_default();
        Self {
            storage,
            wishlist: Wishlist::from_parts(ids, products),
        }
    }

    pub async fn add_item(&mut self, product: ProductSnapshot) {
        self.wishlist.add_item(product);
        self.persist().await;
    }

    pub async fn remove_item(&mut self, product_id: ProductId) {
        self.wishlist.remove_item(product_id);
        self.persist().await;
    }

    /// Returns whether the product is listed afterwards.
    pub async fn toggle_item(&mut self, product: ProductSnapshot) -> bool {
        let listed = self.wishlist.toggle(product);
        self.persist().await;
        listed
    }

    pub async fn clear(&mut self) {
        self.wishlist.clear();
        self.persist().await;
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.wishlist.item_count()
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.wishlist.contains(product_id)
    }

    #[must_use]
    pub fn products(&self) -> Vec<&ProductSnapshot> {
        self.wishlist.products()
    }

    async fn persist(&self) {
        write_json(&self.storage, session_keys::WISHLIST, &self.wishlist.ids()).await;
        write_json(
            &self.storage,
            session_keys::WISHLIST_PRODUCTS,
            self.wishlist.cache(),
        )
        .await;
    }
}
