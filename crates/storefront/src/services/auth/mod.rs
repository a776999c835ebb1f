//! Authentication service.
//!
//! Email/password accounts with Argon2id hashes, plus the OAuth
//! authorization-code flow in [`oauth`].

mod error;
pub mod oauth;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use luxe_jewel_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short or the
    /// confirmation differs.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn register(
        &self,
        email: &str,
        full_name: Option<&str>,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password, confirm_password)?;
        let password_hash = hash_password(password)?;

        let full_name = full_name.map(str::trim).filter(|n| !n.is_empty());
        self.users
            .create_with_password(&email, full_name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update name and avatar. Blank values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, AuthError> {
        let full_name = full_name.map(str::trim).filter(|n| !n.is_empty());
        let avatar_url = avatar_url.map(str::trim).filter(|u| !u.is_empty());
        self.users
            .update_profile(user_id, full_name, avatar_url)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Find or create the account for a verified OAuth identity.
    ///
    /// Existing accounts keep their name and avatar.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the provider's email is unusable.
    #[instrument(skip_all, fields(email = %info.email))]
    pub async fn sign_in_oauth(&self, info: &oauth::UserInfo) -> Result<User, AuthError> {
        let email = Email::parse(&info.email)?;
        let user = self
            .users
            .find_or_create(&email, info.name.as_deref(), info.picture.as_deref())
            .await?;
        Ok(user)
    }
}

/// Check length and confirmation.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` with a user-facing message.
pub fn validate_password(password: &str, confirm_password: &str) -> Result<(), AuthError> {
    if password != confirm_password {
        return Err(AuthError::WeakPassword("Passwords do not match".to_owned()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1", "secret1").is_ok());
        assert!(matches!(
            validate_password("12345", "12345"),
            Err(AuthError::WeakPassword(msg)) if msg.contains("at least 6")
        ));
        assert!(matches!(
            validate_password("secret1", "secret2"),
            Err(AuthError::WeakPassword(msg)) if msg == "Passwords do not match"
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_password("hunter22", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
