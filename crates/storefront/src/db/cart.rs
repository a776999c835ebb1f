//! Server-side cart repository (`storefront.shopping_cart`).

use sqlx::PgPool;
use tracing::debug;

use luxe_jewel_core::{CartItemId, ProductId, UserId, VariantId};

use super::RepositoryError;
use crate::models::{CartLine, CartOwner};

const LINE_SELECT: &str = r"
    SELECT c.id, c.user_id, c.session_id, c.product_id, c.variant_id, c.quantity,
           c.added_at, c.updated_at,
           p.name AS product_name, p.slug AS product_slug, p.price AS product_price,
           COALESCE(p.featured_image, p.images[1]) AS product_image
    FROM storefront.shopping_cart c
    LEFT JOIN storefront.products p ON p.id = c.product_id
";

impl CartOwner {
    fn binds(&self) -> (Option<UserId>, Option<&str>) {
        match self {
            Self::User(id) => (Some(*id), None),
            Self::Session(sid) => (None, Some(sid.as_str())),
        }
    }
}

pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lines for an owner with their product details, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: &CartOwner) -> Result<Vec<CartLine>, RepositoryError> {
        let (user_id, session_id) = owner.binds();
        let sql = format!(
            "{LINE_SELECT} WHERE ($1::int IS NOT NULL AND c.user_id = $1) OR ($2::text IS NOT NULL AND c.session_id = $2) ORDER BY c.added_at DESC, c.id DESC"
        );
        let rows = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .bind(session_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Add a product, incrementing the existing line for the same product and
    /// variant when there is one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let (user_id, session_id) = owner.binds();
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, CartItemId>(
            r"
            SELECT id FROM storefront.shopping_cart
            WHERE product_id = $1
              AND variant_id IS NOT DISTINCT FROM $2
              AND (($3::int IS NOT NULL AND user_id = $3)
                   OR ($4::text IS NOT NULL AND session_id = $4))
            FOR UPDATE
            ",
        )
        .bind(product_id)
        .bind(variant_id)
        .bind(user_id)
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?;

        let id = if let Some(id) = existing {
            sqlx::query::<sqlx::Postgres>(
                r"
                UPDATE storefront.shopping_cart
                SET quantity = quantity + $2, updated_at = NOW()
                WHERE id = $1
                ",
            )
            .bind(id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
            id
        } else {
            sqlx::query_scalar::<_, CartItemId>(
                r"
                INSERT INTO storefront.shopping_cart (user_id, session_id, product_id, variant_id, quantity)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                ",
            )
            .bind(user_id)
            .bind(session_id)
            .bind(product_id)
            .bind(variant_id)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?
        };

        let sql = format!("{LINE_SELECT} WHERE c.id = $1");
        let line = sqlx::query_as::<_, CartLine>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(id = %line.id, quantity = line.quantity, "Cart line saved");
        Ok(line)
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let updated = sqlx::query::<sqlx::Postgres>(
            "UPDATE storefront.shopping_cart SET quantity = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(quantity)
        .execute(self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let sql = format!("{LINE_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, CartLine>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, id: CartItemId) -> Result<u64, RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>("DELETE FROM storefront.shopping_cart WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove every line an owner has.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, owner: &CartOwner) -> Result<u64, RepositoryError> {
        let (user_id, session_id) = owner.binds();
        let result = sqlx::query::<sqlx::Postgres>(
            r"
            DELETE FROM storefront.shopping_cart
            WHERE ($1::int IS NOT NULL AND user_id = $1)
               OR ($2::text IS NOT NULL AND session_id = $2)
            ",
        )
        .bind(user_id)
        .bind(session_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
