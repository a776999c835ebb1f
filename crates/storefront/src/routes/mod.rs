//! HTTP routes for the storefront and back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready   - Liveness and readiness
//!
//! # Catalog
//! GET  /                        - Home payload (featured, new arrivals, categories)
//! GET  /products                - Listing (?sort=&category=)
//! GET  /products/{slug}         - Detail with reviews
//!
//! # Session cart and wishlist
//! GET  /cart                    - Cart contents and subtotal
//! POST /cart/add|update|remove|clear
//! GET  /wishlist                - Saved products (login required)
//! POST /wishlist/toggle|remove|clear
//!
//! # Checkout (login required)
//! GET  /checkout                - Current step, items and totals
//! POST /checkout/shipping|back|payment
//!
//! # Auth (rate limited)
//! POST /register, /login, /logout, /forgot-password
//! GET  /profile, PUT /profile
//! GET  /dashboard               - Greeting, order history and reviews (login required)
//! GET  /auth/oauth/login, /auth/oauth/callback
//!
//! # JSON API (rate limited)
//! GET  /api/search              - Keyword search
//! POST /api/search/ai           - Image or text vector search
//! GET  /api/products, /api/products/{slug}, /api/categories, /api/recommendations
//! *    /api/cart, /api/orders, /api/reviews, /api/wishlist
//! POST /api/payments/intent, /api/payments/confirm
//!
//! # Back office (admin role)
//! GET  /admin, /admin/orders, /admin/products, /admin/analytics
//! PUT  /admin/orders/{id}/status
//! POST /admin/products, PUT|DELETE /admin/products/{id}
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod oauth;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;
use tower_sessions_sqlx_store::PostgresStore;

use crate::middleware::{
    access_guard_middleware, ai_search_rate_limiter, api_rate_limiter, auth_rate_limiter,
    request_id_middleware, security_headers_middleware, session_layer,
};
use crate::state::AppState;

/// Email/password and OAuth routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/auth/oauth/login", get(oauth::login))
        .route(oauth::CALLBACK_PATH, get(oauth::callback))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .route("/dashboard", get(dashboard::show))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/remove", post(wishlist::remove))
        .route("/clear", post(wishlist::clear))
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/shipping", post(checkout::submit_shipping))
        .route("/back", post(checkout::back))
        .route("/payment", post(checkout::submit_payment))
}

/// The JSON API. AI search carries its own, stricter limit.
pub fn api_routes() -> Router<AppState> {
    let ai = Router::new()
        .route("/search/ai", post(api::ai_search::search))
        .layer(ai_search_rate_limiter());

    Router::new()
        .route("/search", get(search::search))
        .route("/products", get(api::products::list))
        .route("/products/{slug}", get(api::products::show))
        .route("/categories", get(api::products::categories))
        .route("/recommendations", get(api::recommendations::list))
        .route(
            "/cart",
            get(api::cart::list)
                .post(api::cart::add)
                .put(api::cart::update)
                .delete(api::cart::remove),
        )
        .route(
            "/orders",
            get(api::orders::get)
                .post(api::orders::create)
                .put(api::orders::update_status),
        )
        .route(
            "/reviews",
            get(api::reviews::list)
                .post(api::reviews::create)
                .put(api::reviews::update)
                .delete(api::reviews::delete),
        )
        .route(
            "/wishlist",
            get(api::wishlist::get)
                .post(api::wishlist::add)
                .delete(api::wishlist::remove),
        )
        .route("/payments/intent", post(api::payments::create_intent))
        .route("/payments/confirm", post(api::payments::confirm))
        .merge(ai)
        .layer(api_rate_limiter())
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", put(admin::update_order_status))
        .route(
            "/products",
            get(admin::products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/analytics", get(admin::analytics))
}

/// Every route, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/", get(products::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/checkout", checkout_routes())
        .merge(auth_routes())
        .nest("/api", api_routes())
        .nest("/admin", admin_routes())
}

/// The full application with sessions stored in `PostgreSQL`.
pub fn app(state: AppState) -> Router {
    let store = PostgresStore::new(state.pool().clone());
    app_with_session_store(state, store)
}

/// The full application over any session store.
///
/// Layers, outermost first: Sentry, tracing, request id, security headers,
/// sessions, access guard.
pub fn app_with_session_store<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let sessions = session_layer(store, state.config());

    routes()
        .layer(from_fn(access_guard_middleware))
        .layer(sessions)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness: the process is up. Touches nothing.
async fn health() -> &'static str {
    "ok"
}

/// Readiness: the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
