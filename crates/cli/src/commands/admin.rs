//! Back-office access.
//!
//! ```bash
//! lj-cli admin promote -e owner@luxejewel.example
//! lj-cli admin demote -e former@luxejewel.example
//! ```
//!
//! Accounts are created by registering through the storefront; these commands
//! only change the role of an existing account.

use luxe_jewel_core::{Email, UserRole};
use luxe_jewel_storefront::db::{RepositoryError, UserRepository};

use super::{CliError, connect};

/// Set the role of the account registered under `email`.
///
/// # Errors
///
/// Returns `CliError::Invalid` for a malformed email or an unknown account.
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::Invalid(e.to_string()))?;
    let pool = connect().await?;

    let user = match UserRepository::new(&pool).set_role(&email, role).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound) => {
            return Err(CliError::Invalid(format!("no account registered for {email}")));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(id = %user.id, email = %user.email, role = %user.role, "Role updated");
    Ok(())
}
