//! `PostgreSQL`-backed sessions via tower-sessions.
//!
//! Sessions carry the logged-in user, the cart and wishlist mirrors, checkout
//! progress and OAuth state.

use sqlx::PgPool;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore, cookie::SameSite, cookie::time::Duration,
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lj_session";

/// Sessions expire after a week without activity.
const SESSION_INACTIVITY_DAYS: i64 = 7;

/// Session layer over the `tower_sessions.session` table.
///
/// The table is created by migrations, not at startup.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer(PostgresStore::new(pool.clone()), config)
}

/// Cookie settings shared by every store.
#[must_use]
pub fn session_layer<S: SessionStore>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_INACTIVITY_DAYS)))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
