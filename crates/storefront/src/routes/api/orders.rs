//! `/api/orders`.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use luxe_jewel_core::{OrderId, OrderStatus, UserId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::{NewOrder, NewOrderItem, Order, OrderDetail};
use crate::services::checkout::generate_order_number;
use crate::state::AppState;

const DEFAULT_PAYMENT_METHOD: &str = "mock";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub order_id: Option<OrderId>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub shipping_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
    pub shipping_address: Option<Value>,
    pub billing_address: Option<Value>,
    pub payment_method: Option<String>,
}

impl CreateOrder {
    fn into_new_order(self, order_number: String) -> Result<NewOrder> {
        if self.items.is_empty() || self.total_amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Valid items and total amount are required".to_owned(),
            ));
        }
        Ok(NewOrder {
            user_id: self.user_id,
            order_number,
            billing_address: self.billing_address.or_else(|| self.shipping_address.clone()),
            shipping_address: self.shipping_address,
            items: self.items,
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            shipping_amount: self.shipping_amount,
            discount_amount: self.discount_amount,
            total_amount: self.total_amount,
            payment_method: self
                .payment_method
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_owned()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    pub id: Option<OrderId>,
    pub status: Option<String>,
}

/// `GET /api/orders?orderId=` returns one order with items; `?userId=` lists.
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool());
    if let Some(id) = query.order_id {
        let detail: OrderDetail = orders
            .get_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;
        return Ok(Json(json!(detail)));
    }
    if let Some(user_id) = query.user_id {
        return Ok(Json(json!(orders.list_for_user(user_id).await?)));
    }
    Err(AppError::BadRequest(
        "User ID or Order ID is required".to_owned(),
    ))
}

/// `POST /api/orders`.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let new_order = body.into_new_order(generate_order_number(Utc::now().timestamp_millis()))?;
    let order = OrderRepository::new(state.pool()).create(&new_order).await?;

    info!(order_number = %order.order_number, total = %order.total_amount, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// `PUT /api/orders { id, status }`.
pub async fn update_status(
    State(state): State<AppState>,
    Json(body): Json<UpdateStatus>,
) -> Result<Json<Order>> {
    let (Some(id), Some(status)) = (body.id, body.status) else {
        return Err(AppError::BadRequest(
            "Order ID and status are required".to_owned(),
        ));
    };
    let status: OrderStatus = status.parse().map_err(AppError::BadRequest)?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, status)
        .await?;
    Ok(Json(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luxe_jewel_core::{ProductId, VariantId};

    use super::*;

    fn request(total: &str, items: serde_json::Value) -> CreateOrder {
        serde_json::from_value(json!({
            "userId": 1,
            "items": items,
            "subtotal": "100.00",
            "totalAmount": total,
        }))
        .unwrap()
    }

    #[test]
    fn test_create_order_requires_items_and_total() {
        let items = json!([{ "productId": 4, "quantity": 1, "price": "100.00" }]);

        let err = request("100.00", json!([]))
            .into_new_order("ORD-1-1".to_owned())
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = request("0", items.clone())
            .into_new_order("ORD-1-1".to_owned())
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let order = request("100.00", items)
            .into_new_order("ORD-1-1".to_owned())
            .unwrap();
        assert_eq!(order.payment_method, "mock");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.user_id, Some(UserId::new(1)));
    }

    #[test]
    fn test_create_order_accepts_snake_case_items() {
        let body: CreateOrder = serde_json::from_value(json!({
            "userId": 1,
            "items": [{ "product_id": 4, "variant_id": 2, "quantity": 1, "price": 100 }],
            "subtotal": 100,
            "totalAmount": 133,
        }))
        .unwrap();

        let order = body.into_new_order("ORD-1-1".to_owned()).unwrap();
        assert_eq!(order.items[0].product_id, ProductId::new(4));
        assert_eq!(order.items[0].variant_id, Some(VariantId::new(2)));
        assert_eq!(order.total_amount, Decimal::new(133, 0));
    }

    #[test]
    fn test_billing_address_defaults_to_shipping() {
        let address = json!({ "address": "1 Diamond Way", "city": "New York", "zip": "10001" });
        let body: CreateOrder = serde_json::from_value(json!({
            "items": [{ "productId": 4, "quantity": 1, "price": "100.00" }],
            "totalAmount": "100.00",
            "shippingAddress": address,
        }))
        .unwrap();
        let order = body.into_new_order("ORD-1-1".to_owned()).unwrap();
        assert_eq!(order.billing_address.as_ref(), Some(&address));
        assert_eq!(order.shipping_address.as_ref(), Some(&address));

        let billing = json!({ "address": "9 Pearl St" });
        let body: CreateOrder = serde_json::from_value(json!({
            "items": [{ "productId": 4, "quantity": 1, "price": "100.00" }],
            "totalAmount": "100.00",
            "shippingAddress": address,
            "billingAddress": billing,
        }))
        .unwrap();
        let order = body.into_new_order("ORD-1-1".to_owned()).unwrap();
        assert_eq!(order.billing_address, Some(billing));
    }
}
