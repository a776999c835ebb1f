//! JSON API under `/api`.

pub mod ai_search;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;
pub mod recommendations;
pub mod reviews;
pub mod wishlist;
