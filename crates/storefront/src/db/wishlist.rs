//! Server-side wishlist repository.

use sqlx::PgPool;

use luxe_jewel_core::{ProductId, UserId, WishlistItemId};

use super::RepositoryError;
use crate::models::WishlistEntry;

const ENTRY_SELECT: &str = r"
    SELECT w.id, w.user_id, w.product_id, w.created_at,
           p.name AS product_name, p.slug AS product_slug, p.price AS product_price,
           COALESCE(p.featured_image, p.images[1]) AS product_image
    FROM storefront.wishlist w
    LEFT JOIN storefront.products p ON p.id = w.product_id
";

pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's wishlist, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let sql = format!("{ENTRY_SELECT} WHERE w.user_id = $1 ORDER BY w.created_at DESC, w.id DESC");
        let rows = sqlx::query_as::<_, WishlistEntry>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// The entry for one product, if the user saved it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        let sql = format!("{ENTRY_SELECT} WHERE w.user_id = $1 AND w.product_id = $2");
        let row = sqlx::query_as::<_, WishlistEntry>(&sql)
            .bind(user_id)
            .bind(product_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already saved.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistEntry, RepositoryError> {
        let id = sqlx::query_scalar::<_, WishlistItemId>(
            "INSERT INTO storefront.wishlist (user_id, product_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_db(e, "Item already in wishlist"))?;

        let sql = format!("{ENTRY_SELECT} WHERE w.id = $1");
        sqlx::query_as::<_, WishlistEntry>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<u64, RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>(
            "DELETE FROM storefront.wishlist WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
