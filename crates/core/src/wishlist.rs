//! Wishlist model.
//!
//! The list itself is an ordered set of product ids. Product snapshots live in
//! a separate cache that survives removals, so re-adding a product or showing
//! recently removed items needs no catalog lookup.

use std::collections::HashMap;

use crate::cart::ProductSnapshot;
use crate::types::ProductId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wishlist {
    ids: Vec<ProductId>,
    products: HashMap<ProductId, ProductSnapshot>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts. Duplicate ids are collapsed.
    #[must_use]
    pub fn from_parts(ids: Vec<ProductId>, products: HashMap<ProductId, ProductSnapshot>) -> Self {
        let mut deduped = Vec::with_capacity(ids.len());
        for id in ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        Self {
            ids: deduped,
            products,
        }
    }

    /// Add a product. The snapshot is refreshed even if already listed.
    pub fn add_item(&mut self, product: ProductSnapshot) {
        if !product.id.is_valid() {
            return;
        }
        if !self.ids.contains(&product.id) {
            self.ids.push(product.id);
        }
        self.products.insert(product.id, product);
    }

    /// Drop a product from the list; its snapshot stays cached.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.ids.retain(|id| *id != product_id);
    }

    /// Add or remove. Returns whether the product is listed afterwards.
    pub fn toggle(&mut self, product: ProductSnapshot) -> bool {
        if self.contains(product.id) {
            self.remove_item(product.id);
            false
        } else {
            let id = product.id;
            self.add_item(product);
            self.contains(id)
        }
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.ids.contains(&product_id)
    }

    /// Listed products in insertion order. Ids without a cached snapshot are skipped.
    #[must_use]
    pub fn products(&self) -> Vec<&ProductSnapshot> {
        self.ids.iter().filter_map(|id| self.products.get(id)).collect()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub const fn cache(&self) -> &HashMap<ProductId, ProductSnapshot> {
        &self.products
    }

    /// Empty both the list and the snapshot cache.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.products.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn snapshot(id: i32, name: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: name.to_owned(),
            slug: name.to_lowercase().replace(' ', "-"),
            price: Decimal::new(4_999, 2),
            compare_price: None,
            featured_image: None,
            category_id: None,
        }
    }

    #[test]
    fn test_toggle_twice_returns_to_empty() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.toggle(snapshot(1, "Bohemian Charm Necklace")));
        assert!(!wishlist.toggle(snapshot(1, "Bohemian Charm Necklace")));
        assert_eq!(wishlist.item_count(), 0);
        assert!(wishlist.products().is_empty());
    }

    #[test]
    fn test_add_is_idempotent_but_refreshes_snapshot() {
        let mut wishlist = Wishlist::new();
        wishlist.add_item(snapshot(4, "Old Name"));
        wishlist.add_item(snapshot(4, "New Name"));
        assert_eq!(wishlist.item_count(), 1);
        assert_eq!(wishlist.products().first().unwrap().name, "New Name");
    }

    #[test]
    fn test_remove_keeps_cache() {
        let mut wishlist = Wishlist::new();
        wishlist.add_item(snapshot(2, "Pearl Drop Earrings"));
        wishlist.remove_item(ProductId::new(2));
        assert!(!wishlist.contains(ProductId::new(2)));
        assert!(wishlist.cache().contains_key(&ProductId::new(2)));

        wishlist.clear();
        assert!(wishlist.cache().is_empty());
    }

    #[test]
    fn test_products_skip_uncached_ids() {
        let mut cache = HashMap::new();
        cache.insert(ProductId::new(1), snapshot(1, "Gold Chain Necklace"));
        let wishlist =
            Wishlist::from_parts(vec![ProductId::new(9), ProductId::new(1), ProductId::new(1)], cache);

        assert_eq!(wishlist.item_count(), 2);
        let names: Vec<_> = wishlist.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Gold Chain Necklace"]);
    }

    #[test]
    fn test_invalid_product_ignored() {
        let mut wishlist = Wishlist::new();
        assert!(!wishlist.toggle(snapshot(0, "Ghost")));
        assert_eq!(wishlist.item_count(), 0);
    }
}
