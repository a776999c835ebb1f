//! User repository.
//!
//! Accounts live in `storefront.users`; password hashes are kept apart in
//! `storefront.user_passwords` so OAuth-only accounts simply have no row there.

use sqlx::PgPool;
use tracing::{debug, instrument};

use luxe_jewel_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, email, full_name, role, avatar_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: Option<String>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM storefront.users WHERE email = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM storefront.users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Create a user without a password (OAuth sign-ups).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO storefront.users (email, full_name, avatar_url)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(full_name)
            .bind(avatar_url)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::unique_or_db(e, "email already exists"))?;

        debug!(id = %user.id, "Created user");
        Ok(user)
    }

    /// Create a user and their password hash in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, password_hash))]
    pub async fn create_with_password(
        &self,
        email: &Email,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r"
            INSERT INTO storefront.users (email, full_name)
            VALUES ($1, $2)
            RETURNING {USER_COLUMNS}
            "
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(full_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::unique_or_db(e, "email already exists"))?;

        sqlx::query::<sqlx::Postgres>(
            "INSERT INTO storefront.user_passwords (user_id, password_hash) VALUES ($1, $2)",
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(id = %user.id, "Registered user");
        Ok(user)
    }

    /// A user and their password hash.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(
            r"
            SELECT u.id, u.email, u.full_name, u.role, u.avatar_url,
                   u.created_at, u.updated_at, p.password_hash
            FROM storefront.users u
            LEFT JOIN storefront.user_passwords p ON p.user_id = u.id
            WHERE u.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.and_then(|r| r.password_hash.map(|hash| (r.user, hash))))
    }

    /// Update profile fields. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.users
            SET full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(full_name)
            .bind(avatar_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    pub async fn set_role(&self, email: &Email, role: UserRole) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.users
            SET role = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(role)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Look up a user by email, creating a password-less account if none exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn find_or_create(
        &self,
        email: &Email,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, RepositoryError> {
        if let Some(user) = self.get_by_email(email).await? {
            return Ok(user);
        }
        match self.create(email, full_name, avatar_url).await {
            // Lost a race with a concurrent sign-in for the same email.
            Err(RepositoryError::Conflict(_)) => self
                .get_by_email(email)
                .await?
                .ok_or(RepositoryError::NotFound),
            other => other,
        }
    }
}
