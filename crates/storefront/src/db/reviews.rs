//! Review repository.
//!
//! Every write recomputes the product's `rating_average` and `rating_count`
//! inside the same transaction.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use luxe_jewel_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

const REVIEW_SELECT: &str = r"
    SELECT r.id, r.product_id, r.user_id, r.rating, r.comment, r.is_approved,
           r.created_at, u.full_name AS reviewer_name
    FROM storefront.reviews r
    LEFT JOIN storefront.users u ON u.id = r.user_id
";

pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Approved reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(&self, id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            "{REVIEW_SELECT} WHERE r.product_id = $1 AND r.is_approved ORDER BY r.created_at DESC, r.id DESC"
        );
        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// All reviews written by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, id: UserId) -> Result<Vec<Review>, RepositoryError> {
        let sql =
            format!("{REVIEW_SELECT} WHERE r.user_id = $1 ORDER BY r.created_at DESC, r.id DESC");
        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including an
    /// unknown product).
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: Option<UserId>,
        rating: i32,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, ReviewId>(
            r"
            INSERT INTO storefront.reviews (product_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        refresh_rating(&mut tx, product_id).await?;
        let review = fetch(&mut tx, id).await?;
        tx.commit().await?;

        debug!(id = %review.id, product = %product_id, "Created review");
        Ok(review)
    }

    /// Change a review's rating and, when given, its comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no review has this id.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_id = sqlx::query_scalar::<_, ProductId>(
            r"
            UPDATE storefront.reviews
            SET rating = $2, comment = COALESCE($3, comment)
            WHERE id = $1
            RETURNING product_id
            ",
        )
        .bind(id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        refresh_rating(&mut tx, product_id).await?;
        let review = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(review)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no review has this id.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_id = sqlx::query_scalar::<_, ProductId>(
            "DELETE FROM storefront.reviews WHERE id = $1 RETURNING product_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        refresh_rating(&mut tx, product_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn fetch(tx: &mut Transaction<'_, Postgres>, id: ReviewId) -> Result<Review, RepositoryError> {
    let sql = format!("{REVIEW_SELECT} WHERE r.id = $1");
    sqlx::query_as::<_, Review>(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::NotFound)
}

async fn refresh_rating(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    sqlx::query::<Postgres>(
        r"
        UPDATE storefront.products p
        SET rating_average = COALESCE(s.avg, 0),
            rating_count = s.cnt
        FROM (
            SELECT ROUND(AVG(rating)::numeric, 2) AS avg, COUNT(*)::int AS cnt
            FROM storefront.reviews
            WHERE product_id = $1 AND is_approved
        ) s
        WHERE p.id = $1
        ",
    )
    .bind(product_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
