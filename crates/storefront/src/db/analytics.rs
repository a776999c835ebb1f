//! Aggregates for the back-office dashboard.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use luxe_jewel_core::OrderStatus;

use super::RepositoryError;

/// Store-wide totals.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StoreTotals {
    pub total_revenue: Decimal,
    pub order_count: i64,
    pub customer_count: i64,
}

impl StoreTotals {
    /// Combine per-status order aggregates. Every status counts, cancelled
    /// included, so revenue and order count always describe the same orders.
    #[must_use]
    pub fn from_status_rows(rows: &[StatusTotals], customer_count: i64) -> Self {
        rows.iter().fold(
            Self {
                customer_count,
                ..Self::default()
            },
            |acc, row| Self {
                total_revenue: acc.total_revenue + row.revenue,
                order_count: acc.order_count + row.order_count,
                ..acc
            },
        )
    }

    /// Revenue per order, rounded to cents; zero without orders.
    #[must_use]
    pub fn average_order_value(&self) -> Decimal {
        if self.order_count == 0 {
            return Decimal::ZERO;
        }
        (self.total_revenue / Decimal::from(self.order_count)).round_dp(2)
    }
}

/// Revenue and count for one order status.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct StatusTotals {
    pub status: OrderStatus,
    pub revenue: Decimal,
    pub order_count: i64,
}

pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Revenue and count over all orders, and the number of accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn totals(&self) -> Result<StoreTotals, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusTotals>(
            r"
            SELECT status, COALESCE(SUM(total_amount), 0) AS revenue, COUNT(*) AS order_count
            FROM storefront.orders
            GROUP BY status
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let customer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.users")
            .fetch_one(self.pool)
            .await?;

        Ok(StoreTotals::from_status_rows(&rows, customer_count))
    }
}
