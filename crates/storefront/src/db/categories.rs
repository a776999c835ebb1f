//! Category repository.

use sqlx::PgPool;

use luxe_jewel_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, description, image_url
            FROM storefront.categories
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Resolve a category slug to its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn id_for_slug(&self, slug: &str) -> Result<Option<CategoryId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, CategoryId>(
            "SELECT id FROM storefront.categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(id)
    }

    /// Insert or update a category keyed by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<CategoryId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CategoryId>(
            r"
            INSERT INTO storefront.categories (name, slug, description, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                image_url = EXCLUDED.image_url
            RETURNING id
            ",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Delete categories by slug. Products in them keep existing, uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_slugs(&self, slugs: &[String]) -> Result<u64, RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>(
            "DELETE FROM storefront.categories WHERE slug = ANY($1)",
        )
        .bind(slugs)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
