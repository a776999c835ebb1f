//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] luxe_jewel_core::EmailError),

    /// Wrong password, unknown email, or an OAuth-only account.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too short or confirmation mismatch.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// OAuth is not configured.
    #[error("oauth provider not configured")]
    OAuthDisabled,

    /// OAuth state missing from the session or not matching the callback.
    #[error("invalid session state")]
    InvalidSessionState,

    /// The OAuth provider rejected a request or returned something unusable.
    #[error("oauth provider error: {0}")]
    OAuthProvider(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}
