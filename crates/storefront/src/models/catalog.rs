//! Catalog types: products and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use luxe_jewel_core::{CategoryId, ProductId, ProductSnapshot, discount_percentage};

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A catalog product, joined with its category.
///
/// The embedding vector itself is never loaded here; `has_embedding` tells
/// whether vector recommendations are possible.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub images: Vec<String>,
    pub featured_image: Option<String>,
    pub material: Option<String>,
    pub gemstone: Option<String>,
    pub inventory_quantity: i32,
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_sale: bool,
    pub is_active: bool,
    pub view_count: i32,
    pub has_embedding: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The subset stored in carts and wishlists.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            price: self.price,
            compare_price: self.compare_price,
            featured_image: self
                .featured_image
                .clone()
                .or_else(|| self.images.first().cloned()),
            category_id: self.category_id,
        }
    }

    #[must_use]
    pub fn discount_percentage(&self) -> Option<u32> {
        discount_percentage(self.price, self.compare_price)
    }
}

/// Writable product fields, shared by the back office and the seeder.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    #[serde(default)]
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub gemstone: Option<String>,
    #[serde(default)]
    pub inventory_quantity: i32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl ProductInput {
    /// Reject input the database would accept but the shop cannot sell.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_owned());
        }
        let slug_ok = !self.slug.is_empty()
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !slug_ok {
            return Err("Slug must contain only lowercase letters, digits and hyphens".to_owned());
        }
        if self.price.is_sign_negative() {
            return Err("Price cannot be negative".to_owned());
        }
        if self.inventory_quantity < 0 {
            return Err("Inventory cannot be negative".to_owned());
        }
        Ok(())
    }
}

/// A product returned by vector similarity search.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductMatch {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    pub similarity: f64,
}
