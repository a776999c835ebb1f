//! LuxeJewel Core - shared domain types.
//!
//! Used by every LuxeJewel component:
//! - `storefront` - JSON API for the shop and its back office
//! - `cli` - migrations, seeding and embedding generation
//!
//! Nothing in here performs I/O. Database support (sqlx `Type`/`Encode`/`Decode`
//! impls) is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, money helpers, statuses and sort orders
//! - [`cart`] - the shopping cart model
//! - [`wishlist`] - the wishlist model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;
pub mod wishlist;

pub use cart::{Cart, CartItem, ProductSnapshot};
pub use types::*;
pub use wishlist::Wishlist;
