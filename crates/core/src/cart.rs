//! Shopping cart model.
//!
//! A cart holds at most one line per product, and every line has a quantity
//! of at least one. Lines keep a snapshot of the product so the cart can be
//! rendered without another catalog lookup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId};

/// The subset of a product row carried in carts and wishlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    #[serde(default)]
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub product: ProductSnapshot,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart contents in insertion order.
///
/// Serializes as a bare JSON array of [`CartItem`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `product`, merging with an existing line.
    ///
    /// Products without a valid id and non-positive quantities are ignored.
    pub fn add_item(&mut self, product: ProductSnapshot, quantity: i32) {
        if !product.id.is_valid() || quantity <= 0 {
            return;
        }

        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartItem {
            product_id: product.id,
            quantity,
            product,
        });
    }

    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i32) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ring() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(1),
            name: "Sapphire Halo Ring".to_owned(),
            slug: "sapphire-halo-ring".to_owned(),
            price: Decimal::new(59_999, 2),
            compare_price: None,
            featured_image: None,
            category_id: Some(CategoryId::new(1)),
        }
    }

    fn studs() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(2),
            name: "CZ Huggie Earrings".to_owned(),
            slug: "cz-huggie-earrings".to_owned(),
            price: Decimal::new(3_999, 2),
            compare_price: Some(Decimal::new(4_999, 2)),
            featured_image: Some("https://images.example/huggie.jpg".to_owned()),
            category_id: Some(CategoryId::new(3)),
        }
    }

    #[test]
    fn test_add_item_merges_lines() {
        let mut cart = Cart::new();
        cart.add_item(ring(), 1);
        cart.add_item(ring(), 2);
        cart.add_item(studs(), 1);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items().first().unwrap().quantity, 3);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_add_item_ignores_invalid() {
        let mut cart = Cart::new();
        let mut bogus = ring();
        bogus.id = ProductId::new(0);
        cart.add_item(bogus, 1);
        cart.add_item(ring(), 0);
        cart.add_item(ring(), -2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add_item(ring(), 1);
        cart.update_quantity(ring().id, 5);
        assert_eq!(cart.item_count(), 5);

        cart.update_quantity(studs().id, 3);
        assert!(!cart.contains(studs().id));

        cart.update_quantity(ring().id, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(ring(), 1);
        cart.add_item(studs(), 1);
        cart.remove_item(ring().id);
        assert!(!cart.contains(ring().id));
        assert!(cart.contains(studs().id));
        cart.clear();
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::new();
        cart.add_item(ring(), 2);
        cart.add_item(studs(), 1);
        assert_eq!(cart.subtotal(), Decimal::new(123_997, 2));
        assert_eq!(Cart::new().subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_persisted_shape() {
        let mut cart = Cart::new();
        cart.add_item(studs(), 2);
        let value = serde_json::to_value(&cart).unwrap();
        let line = value.get(0).unwrap();
        assert_eq!(line.get("productId").unwrap(), 2);
        assert_eq!(line.get("quantity").unwrap(), 2);
        assert_eq!(
            line.pointer("/product/featuredImage").unwrap(),
            "https://images.example/huggie.jpg"
        );

        let back: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }
}
