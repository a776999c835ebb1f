//! Integration tests for the LuxeJewel storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p luxe-jewel-cli -- migrate
//! cargo run -p luxe-jewel-cli -- seed
//! PAYMENT_MOCK_DELAY_SCALE=0 cargo run -p luxe-jewel-storefront &
//! cargo test -p luxe-jewel-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP and are `#[ignore]`d by default.
//! `STOREFRONT_TEST_URL` overrides the default `http://localhost:3000`.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Password used for every account the tests register.
pub const TEST_PASSWORD: &str = "sparkle-and-shine";

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Absolute URL for a path on the storefront.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A client that keeps the session cookie and does not follow redirects,
/// so tests can assert on them.
///
/// Each client presents its own forwarded address so per-IP rate limits on
/// the auth routes do not leak between tests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    let [a, b, c, ..] = *Uuid::new_v4().as_bytes();
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&format!("10.{a}.{b}.{c}")).expect("valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@luxejewel.example", Uuid::new_v4().simple())
}

/// Register a fresh customer on `client`, leaving it logged in.
/// Returns the `user` object from the response.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn register(client: &Client) -> Value {
    let resp = client
        .post(url("/register"))
        .json(&json!({
            "email": unique_email(),
            "password": TEST_PASSWORD,
            "confirmPassword": TEST_PASSWORD,
            "fullName": "Test Customer",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse registration");
    body["user"].clone()
}

/// The first active product in the catalog.
///
/// # Panics
///
/// Panics if the catalog is empty; run `lj-cli seed` first.
pub async fn any_product(client: &Client) -> Value {
    let products: Vec<Value> = client
        .get(url("/api/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse products");
    products
        .into_iter()
        .next()
        .expect("Catalog is empty; run `lj-cli seed` first")
}
