//! Back office: dashboard, orders, products and analytics. Admins only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

use luxe_jewel_core::{OrderId, OrderStatus, ProductId};

use crate::db::{AnalyticsRepository, OrderRepository, ProductRepository, StoreTotals};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderSummary, Product, ProductInput};
use crate::state::AppState;

const DASHBOARD_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub totals: StoreTotals,
    pub average_order_value: Decimal,
    pub recent_orders: Vec<OrderSummary>,
    pub top_products: Vec<Product>,
}

/// `GET /admin`
#[instrument(skip_all, fields(admin = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Dashboard>> {
    let pool = state.pool();
    let analytics = AnalyticsRepository::new(pool);
    let orders = OrderRepository::new(pool);
    let products = ProductRepository::new(pool);
    let (totals, recent_orders, top_products) = tokio::try_join!(
        analytics.totals(),
        orders.recent(DASHBOARD_LIMIT),
        products.top_by_views(DASHBOARD_LIMIT),
    )?;

    Ok(Json(Dashboard {
        average_order_value: totals.average_order_value(),
        totals,
        recent_orders,
        top_products,
    }))
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl OrdersQuery {
    /// Blank or `all` means no status filter.
    fn status(&self) -> Result<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("" | "all") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(AppError::BadRequest),
        }
    }

    fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// `GET /admin/orders?search=&status=`
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderSummary>>> {
    let status = query.status()?;
    let rows = OrderRepository::new(state.pool())
        .admin_list(query.search(), status)
        .await?;
    Ok(Json(rows))
}

/// `PUT /admin/orders/{id}/status`
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, body.status)
        .await?;
    info!(admin = %admin.id, order = %order.order_number, status = %order.status, "Order status changed");
    Ok(Json(order))
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
}

/// `GET /admin/products?search=`, including inactive products.
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = ProductRepository::new(state.pool()).admin_list(search).await?;
    Ok(Json(rows))
}

/// `POST /admin/products`
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    input.validate().map_err(AppError::BadRequest)?;

    let repo = ProductRepository::new(state.pool());
    let id = repo.create(&input).await?;
    state.catalog().invalidate_all();
    info!(admin = %admin.id, product = %id, slug = %input.slug, "Product created");

    let product = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /admin/products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    input.validate().map_err(AppError::BadRequest)?;

    let repo = ProductRepository::new(state.pool());
    repo.update(id, &input).await?;
    state.catalog().invalidate_all();
    info!(admin = %admin.id, product = %id, "Product updated");

    repo.get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// `DELETE /admin/products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    ProductRepository::new(state.pool()).delete(id).await?;
    state.catalog().invalidate_all();
    info!(admin = %admin.id, product = %id, "Product deleted");
    Ok(Json(json!({ "message": "Product deleted" })))
}

// =============================================================================
// Analytics
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthlyRevenue {
    pub month: &'static str,
    pub revenue: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TopSeller {
    pub name: &'static str,
    pub sales: u32,
    pub revenue: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeadlineStat {
    pub title: &'static str,
    pub value: &'static str,
    pub change: &'static str,
}

/// Placeholder figures until order history is rich enough to chart.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Analytics {
    pub revenue_by_month: &'static [MonthlyRevenue],
    pub top_products: &'static [TopSeller],
    pub customer_stats: &'static [HeadlineStat],
}

const fn month(month: &'static str, revenue: u32) -> MonthlyRevenue {
    MonthlyRevenue { month, revenue }
}

pub const ANALYTICS: Analytics = Analytics {
    revenue_by_month: &[
        month("Jan", 12_500),
        month("Feb", 18_900),
        month("Mar", 14_200),
        month("Apr", 17_800),
        month("May", 21_000),
        month("Jun", 24_500),
        month("Jul", 19_800),
        month("Aug", 22_100),
        month("Sep", 25_600),
        month("Oct", 28_900),
        month("Nov", 32_400),
        month("Dec", 38_700),
    ],
    top_products: &[
        TopSeller { name: "Gilded Solitaire Crystal Ring", sales: 124, revenue: 3_100 },
        TopSeller { name: "Crystal Shimmer Necklace", sales: 98, revenue: 3_430 },
        TopSeller { name: "Dazzling Bar Studs", sales: 87, revenue: 1_131 },
        TopSeller { name: "Golden Link Bracelet", sales: 76, revenue: 1_748 },
        TopSeller { name: "Sapphire Halo Ring", sales: 54, revenue: 32_396 },
    ],
    customer_stats: &[
        HeadlineStat { title: "New Customers", value: "1,248", change: "+12.5%" },
        HeadlineStat { title: "Returning Customers", value: "892", change: "+8.2%" },
        HeadlineStat { title: "Avg. Order Value", value: "$124.99", change: "+5.3%" },
        HeadlineStat { title: "Conversion Rate", value: "4.7%", change: "+1.2%" },
    ],
};

/// `GET /admin/analytics`
pub async fn analytics(RequireAdmin(_): RequireAdmin) -> Json<Analytics> {
    Json(ANALYTICS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(status: Option<&str>, search: Option<&str>) -> OrdersQuery {
        OrdersQuery {
            search: search.map(str::to_owned),
            status: status.map(str::to_owned),
        }
    }

    #[test]
    fn test_orders_query_status_filter() {
        assert_eq!(query(None, None).status().unwrap(), None);
        assert_eq!(query(Some("all"), None).status().unwrap(), None);
        assert_eq!(
            query(Some("shipped"), None).status().unwrap(),
            Some(OrderStatus::Shipped)
        );
        assert!(matches!(
            query(Some("lost"), None).status(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_orders_query_blank_search_is_none() {
        assert_eq!(query(None, Some("  ")).search(), None);
        assert_eq!(query(None, Some(" ORD-1 ")).search(), Some("ORD-1"));
    }

    #[test]
    fn test_analytics_covers_a_year() {
        assert_eq!(ANALYTICS.revenue_by_month.len(), 12);
        let json = serde_json::to_value(ANALYTICS).unwrap();
        assert_eq!(json["top_products"][0]["sales"], 124);
    }
}
