//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `ai` - image/text product search over embeddings with provider fallback
//! - `auth` - password and OAuth authentication
//! - `catalog` - cached catalog reads and listing order
//! - `checkout` - the shipping, payment, complete flow
//! - `payment` - the simulated payment provider
//! - `stores` - session-persisted cart and wishlist

pub mod ai;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod payment;
pub mod stores;
