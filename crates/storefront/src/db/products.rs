//! Product repository.
//!
//! Every read goes through `product_select!`, which joins the category so
//! rows always carry `category_name` and `category_slug`.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use luxe_jewel_core::{CategoryId, ProductId};

use super::{RepositoryError, format_embedding, like_pattern};
use crate::models::{Product, ProductInput, ProductMatch};

macro_rules! product_select {
    () => {
        r"
        SELECT p.id, p.name, p.slug, p.description, p.short_description,
               p.price, p.compare_price, p.category_id,
               c.name AS category_name, c.slug AS category_slug,
               p.images, p.featured_image, p.material, p.gemstone,
               p.inventory_quantity, p.rating_average, p.rating_count,
               p.is_featured, p.is_new, p.is_sale, p.is_active, p.view_count,
               (p.embedding IS NOT NULL) AS has_embedding,
               p.created_at, p.updated_at
        FROM storefront.products p
        LEFT JOIN storefront.categories c ON c.id = p.category_id
        "
    };
}

/// Filters for keyword search. `None` fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub text: Option<String>,
    pub category_slug: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// A product awaiting an embedding.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmbeddingSource {
    pub id: ProductId,
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active products, newest first, optionally limited to a category slug or to featured items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        category_slug: Option<&str>,
        featured_only: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            WHERE p.is_active
              AND ($1::text IS NULL OR c.slug = $1)
              AND (NOT $2 OR p.is_featured)
            ORDER BY p.created_at DESC, p.id DESC
            "
        ))
        .bind(category_slug)
        .bind(featured_only)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed active products");
        Ok(rows)
    }

    /// Up to `limit` featured active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            WHERE p.is_active AND p.is_featured
            ORDER BY p.id
            LIMIT $1
            "
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The `limit` most recently added active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn newest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            WHERE p.is_active
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1
            "
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(concat!(product_select!(), "WHERE p.slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(concat!(product_select!(), "WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Count a product page view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn increment_view_count(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query::<sqlx::Postgres>(
            r"
            UPDATE storefront.products
            SET view_count = view_count + 1
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Keyword search over active products.
    ///
    /// Text matches case-insensitively against name, descriptions, material and gemstone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Product>, RepositoryError> {
        let pattern = filters.text.as_deref().map(like_pattern);
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            WHERE p.is_active
              AND ($1::text IS NULL OR c.slug = $1)
              AND ($2::numeric IS NULL OR p.price >= $2)
              AND ($3::numeric IS NULL OR p.price <= $3)
              AND ($4::text IS NULL
                   OR p.name ILIKE $4
                   OR p.description ILIKE $4
                   OR p.short_description ILIKE $4
                   OR p.material ILIKE $4
                   OR p.gemstone ILIKE $4)
            ORDER BY p.id
            "
        ))
        .bind(filters.category_slug.as_deref())
        .bind(filters.min_price)
        .bind(filters.max_price)
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Keyword search");
        Ok(rows)
    }

    /// Plain name/description match used when semantic search is unavailable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn keyword_fallback(
        &self,
        text: &str,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            WHERE p.is_active
              AND (p.name ILIKE $1 OR p.description ILIKE $1)
            ORDER BY p.id
            LIMIT $2
            "
        ))
        .bind(like_pattern(text))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Cosine-similarity search through `storefront.match_products`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, embedding), fields(dims = embedding.len()))]
    pub async fn match_embedding(
        &self,
        embedding: &[f32],
        threshold: f64,
        count: i32,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<ProductMatch>, RepositoryError> {
        let embedding_str = format_embedding(embedding);
        let rows = sqlx::query_as::<_, ProductMatch>(r"
            SELECT p.id, p.name, p.slug, p.description, p.short_description,
                   p.price, p.compare_price, p.category_id,
                   c.name AS category_name, c.slug AS category_slug,
                   p.images, p.featured_image, p.material, p.gemstone,
                   p.inventory_quantity, p.rating_average, p.rating_count,
                   p.is_featured, p.is_new, p.is_sale, p.is_active, p.view_count,
                   TRUE AS has_embedding, p.created_at, p.updated_at,
                   m.similarity
            FROM storefront.match_products($1::vector, $2, $3, $4) m
            JOIN storefront.products p ON p.id = m.id
            LEFT JOIN storefront.categories c ON c.id = p.category_id
            ORDER BY m.similarity DESC
            ")
        .bind(&embedding_str)
        .bind(threshold)
        .bind(count)
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Vector matches");
        Ok(rows)
    }

    /// Products most similar to an already-embedded product, excluding itself.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn similar_to(
        &self,
        id: ProductId,
        threshold: f64,
        count: i32,
    ) -> Result<Vec<ProductMatch>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductMatch>(r"
            SELECT p.id, p.name, p.slug, p.description, p.short_description,
                   p.price, p.compare_price, p.category_id,
                   c.name AS category_name, c.slug AS category_slug,
                   p.images, p.featured_image, p.material, p.gemstone,
                   p.inventory_quantity, p.rating_average, p.rating_count,
                   p.is_featured, p.is_new, p.is_sale, p.is_active, p.view_count,
                   TRUE AS has_embedding, p.created_at, p.updated_at,
                   m.similarity
            FROM storefront.match_products(
                     (SELECT embedding FROM storefront.products WHERE id = $1), $2, $3 + 1
                 ) m
            JOIN storefront.products p ON p.id = m.id
            LEFT JOIN storefront.categories c ON c.id = p.category_id
            WHERE p.id <> $1
            ORDER BY m.similarity DESC
            LIMIT $3
            ")
        .bind(id)
        .bind(threshold)
        .bind(count)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Active products sharing a category, excluding one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn same_category(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            WHERE p.is_active AND p.category_id = $1 AND p.id <> $2
            ORDER BY p.id
            LIMIT $3
            "
        ))
        .bind(category_id)
        .bind(exclude)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // Back office
    // =========================================================================

    /// All products (active or not), newest first, optionally filtered by name/description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_list(&self, search: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            WHERE $1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1
            ORDER BY p.created_at DESC, p.id DESC
            "
        ))
        .bind(search.map(like_pattern))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.products
                (name, slug, price, compare_price, description, short_description,
                 category_id, images, featured_image, material, gemstone,
                 inventory_quantity, is_featured, is_new, is_sale, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price)
        .bind(input.compare_price)
        .bind(input.description.as_deref())
        .bind(input.short_description.as_deref())
        .bind(input.category_id)
        .bind(&input.images)
        .bind(input.featured_image.as_deref())
        .bind(input.material.as_deref())
        .bind(input.gemstone.as_deref())
        .bind(input.inventory_quantity)
        .bind(input.is_featured)
        .bind(input.is_new)
        .bind(input.is_sale)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_db(e, "slug already exists"))?;

        debug!(%id, "Created product");
        Ok(id)
    }

    /// Overwrite a product's writable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<(), RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>(
            r"
            UPDATE storefront.products
            SET name = $2, slug = $3, price = $4, compare_price = $5,
                description = $6, short_description = $7, category_id = $8,
                images = $9, featured_image = $10, material = $11, gemstone = $12,
                inventory_quantity = $13, is_featured = $14, is_new = $15,
                is_sale = $16, is_active = $17, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price)
        .bind(input.compare_price)
        .bind(input.description.as_deref())
        .bind(input.short_description.as_deref())
        .bind(input.category_id)
        .bind(&input.images)
        .bind(input.featured_image.as_deref())
        .bind(input.material.as_deref())
        .bind(input.gemstone.as_deref())
        .bind(input.inventory_quantity)
        .bind(input.is_featured)
        .bind(input.is_new)
        .bind(input.is_sale)
        .bind(input.is_active)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_db(e, "slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>("DELETE FROM storefront.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Most viewed products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_by_views(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            r"
            ORDER BY p.view_count DESC, p.id
            LIMIT $1
            "
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // Maintenance (CLI)
    // =========================================================================

    /// Insert or update a product keyed by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(&self, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.products
                (name, slug, price, compare_price, description, short_description,
                 category_id, images, featured_image, material, gemstone,
                 inventory_quantity, is_featured, is_new, is_sale, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name, price = EXCLUDED.price,
                compare_price = EXCLUDED.compare_price,
                description = EXCLUDED.description,
                short_description = EXCLUDED.short_description,
                category_id = EXCLUDED.category_id, images = EXCLUDED.images,
                featured_image = EXCLUDED.featured_image,
                material = EXCLUDED.material, gemstone = EXCLUDED.gemstone,
                inventory_quantity = EXCLUDED.inventory_quantity,
                is_featured = EXCLUDED.is_featured, is_new = EXCLUDED.is_new,
                is_sale = EXCLUDED.is_sale, is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price)
        .bind(input.compare_price)
        .bind(input.description.as_deref())
        .bind(input.short_description.as_deref())
        .bind(input.category_id)
        .bind(&input.images)
        .bind(input.featured_image.as_deref())
        .bind(input.material.as_deref())
        .bind(input.gemstone.as_deref())
        .bind(input.inventory_quantity)
        .bind(input.is_featured)
        .bind(input.is_new)
        .bind(input.is_sale)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Active products to embed: those without an embedding, or all with `force`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn embedding_sources(
        &self,
        force: bool,
    ) -> Result<Vec<EmbeddingSource>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmbeddingSource>(
            r"
            SELECT id, name, short_description, description
            FROM storefront.products
            WHERE is_active AND ($1 OR embedding IS NULL)
            ORDER BY id
            ",
        )
        .bind(force)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_embedding(
        &self,
        id: ProductId,
        embedding: &[f32],
    ) -> Result<(), RepositoryError> {
        sqlx::query::<sqlx::Postgres>(
            r"
            UPDATE storefront.products
            SET embedding = $2::vector, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(format_embedding(embedding))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Delete every product whose slug is not listed. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_except(&self, keep_slugs: &[String]) -> Result<u64, RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>(
            "DELETE FROM storefront.products WHERE NOT (slug = ANY($1))",
        )
        .bind(keep_slugs)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
