//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and serialize with the column names the
//! JSON API exposes (snake_case). Request payloads live next to their routes.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;
pub mod session;
pub mod user;
pub mod wishlist;

pub use cart::{CartLine, CartOwner};
pub use catalog::{Category, Product, ProductInput, ProductMatch};
pub use order::{NewOrder, NewOrderItem, Order, OrderDetail, OrderItemDetail, OrderSummary};
pub use review::Review;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
pub use wishlist::WishlistEntry;
