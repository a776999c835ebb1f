//! LuxeJewel storefront library.
//!
//! The JSON API for catalog browsing, carts, wishlists, checkout, orders,
//! reviews, accounts, AI search and the admin back office. The binary in
//! `main.rs` and the integration tests build on it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
