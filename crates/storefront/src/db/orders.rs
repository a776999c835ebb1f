//! Order repository.

use sqlx::PgPool;
use tracing::{debug, instrument};

use luxe_jewel_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use super::{RepositoryError, like_pattern};
use crate::models::{NewOrder, NewOrderItem, Order, OrderDetail, OrderItemDetail, OrderSummary};

const ORDER_COLUMNS: &str = r"
    o.id, o.user_id, o.order_number, o.status, o.subtotal, o.tax_amount,
    o.shipping_amount, o.discount_amount, o.total_amount, o.shipping_address,
    o.billing_address, o.payment_status, o.payment_method, o.created_at, o.updated_at
";

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its items in one transaction, then clear the
    /// owner's server cart. New orders are `pending` and `paid`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, order), fields(order_number = %order.order_number, items = order.items.len()))]
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r"
            INSERT INTO storefront.orders AS o
                (user_id, order_number, status, subtotal, tax_amount, shipping_amount,
                 discount_amount, total_amount, shipping_address, billing_address,
                 payment_status, payment_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ORDER_COLUMNS}
            "
        );
        let created = sqlx::query_as::<_, Order>(&sql)
            .bind(order.user_id)
            .bind(&order.order_number)
            .bind(OrderStatus::Pending)
            .bind(order.subtotal)
            .bind(order.tax_amount)
            .bind(order.shipping_amount)
            .bind(order.discount_amount)
            .bind(order.total_amount)
            .bind(order.shipping_address.as_ref())
            .bind(order.billing_address.as_ref())
            .bind(PaymentStatus::Paid)
            .bind(&order.payment_method)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::unique_or_db(e, "order number already exists"))?;

        for NewOrderItem {
            product_id,
            variant_id,
            quantity,
            price,
        } in &order.items
        {
            sqlx::query::<sqlx::Postgres>(
                r"
                INSERT INTO storefront.order_items
                    (order_id, product_id, variant_id, quantity, price_at_purchase)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(created.id)
            .bind(product_id)
            .bind(variant_id)
            .bind(quantity)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(user_id) = order.user_id {
            sqlx::query::<sqlx::Postgres>("DELETE FROM storefront.shopping_cart WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(id = %created.id, "Created order");
        Ok(created)
    }

    /// An order with its items and their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM storefront.orders o WHERE o.id = $1");
        let Some(order) = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemDetail>(
            r"
            SELECT i.id, i.order_id, i.product_id, i.variant_id, i.quantity,
                   i.price_at_purchase,
                   p.name AS product_name, p.slug AS product_slug,
                   COALESCE(p.featured_image, p.images[1]) AS product_image
            FROM storefront.order_items i
            LEFT JOIN storefront.products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY i.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail { order, items }))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders o WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC"
        );
        let rows = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Change an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.orders AS o
            SET status = $2, updated_at = NOW()
            WHERE o.id = $1
            RETURNING {ORDER_COLUMNS}
            "
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Back-office listing with customer names.
    ///
    /// `search` matches order number or customer name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_list(
        &self,
        search: Option<&str>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}, u.full_name AS customer_name
            FROM storefront.orders o
            LEFT JOIN storefront.users u ON u.id = o.user_id
            WHERE ($1::text IS NULL OR o.order_number ILIKE $1 OR u.full_name ILIKE $1)
              AND ($2::storefront.order_status IS NULL OR o.status = $2)
            ORDER BY o.created_at DESC, o.id DESC
            "
        );
        let rows = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(search.map(like_pattern))
            .bind(status)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// The most recent orders with customer names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<OrderSummary>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}, u.full_name AS customer_name
            FROM storefront.orders o
            LEFT JOIN storefront.users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $1
            "
        );
        let rows = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }
}
