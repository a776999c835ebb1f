//! Database migrations.
//!
//! ```bash
//! lj-cli migrate
//! ```
//!
//! Migration files live in `crates/storefront/migrations/` and are embedded
//! at compile time.

use super::{CliError, connect};

/// Apply all pending storefront migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
