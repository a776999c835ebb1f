//! Checkout handlers: shipping, then payment, then complete.
//!
//! All routes need a logged-in user. Progress is kept in the session under
//! `checkout`; the cart comes from the session cart.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Serialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use luxe_jewel_core::CartItem;

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::session_keys;
use crate::routes::cart::session_cart;
use crate::services::checkout::{
    CHECKOUT_CURRENCY, CheckoutError, CheckoutState, CheckoutStep, CompletedOrder, OrderTotals,
    PaymentInfo, ShippingInfo, build_order, generate_order_number,
};
use crate::services::payment::PaymentProvider;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub shipping: Option<ShippingInfo>,
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<CompletedOrder>,
}

async fn load_state(session: &Session) -> CheckoutState {
    match session.get::<CheckoutState>(session_keys::CHECKOUT).await {
        Ok(state) => state.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable checkout state");
            CheckoutState::default()
        }
    }
}

async fn save_state(session: &Session, state: &CheckoutState) -> Result<()> {
    session
        .insert(session_keys::CHECKOUT, state)
        .await
        .map_err(AppError::internal)
}

async fn view(session: Session, checkout: CheckoutState) -> Response {
    let cart = session_cart(session).await;
    if checkout.needs_cart(cart.cart()) {
        return Redirect::to("/cart").into_response();
    }

    let totals = match &checkout.last_order {
        Some(order) if checkout.step == CheckoutStep::Complete => order.totals,
        _ => OrderTotals::for_subtotal(cart.subtotal()),
    };
    Json(CheckoutView {
        step: checkout.step,
        shipping: checkout.shipping,
        items: cart.items().to_vec(),
        totals,
        order: checkout.last_order,
    })
    .into_response()
}

/// `GET /checkout`. An empty cart before completion redirects to `/cart`.
pub async fn show(session: Session, RequireAuth(_user): RequireAuth) -> Response {
    let checkout = load_state(&session).await;
    view(session, checkout).await
}

/// `POST /checkout/shipping`
pub async fn submit_shipping(
    session: Session,
    RequireAuth(_user): RequireAuth,
    Json(info): Json<ShippingInfo>,
) -> Result<Response> {
    let mut checkout = load_state(&session).await;
    checkout.submit_shipping(info)?;
    save_state(&session, &checkout).await?;
    Ok(view(session, checkout).await)
}

/// `POST /checkout/back`
pub async fn back(session: Session, RequireAuth(_user): RequireAuth) -> Result<Response> {
    let mut checkout = load_state(&session).await;
    checkout.back();
    save_state(&session, &checkout).await?;
    Ok(view(session, checkout).await)
}

/// `POST /checkout/payment`
///
/// Charges the mock provider for the cart total, records the order as
/// `mock-card`, empties the cart and completes checkout. A decline answers
/// 402 with the provider's message and leaves everything as it was.
#[instrument(skip(state, session, payment), fields(user_id = %user.id))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(payment): Json<PaymentInfo>,
) -> Result<Response> {
    let mut checkout = load_state(&session).await;
    let shipping = checkout.ready_for_payment()?.clone();
    payment.validate()?;

    let mut cart = session_cart(session.clone()).await;
    if cart.cart().is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    let totals = OrderTotals::for_subtotal(cart.subtotal());

    let charge = state
        .payments()
        .process_payment(totals.total, CHECKOUT_CURRENCY)
        .await;
    if !charge.succeeded() {
        let reason = charge.error.unwrap_or_else(|| "Unknown error".to_owned());
        warn!(payment_id = %charge.id, reason = %reason, "Checkout payment declined");
        return Err(CheckoutError::PaymentFailed(reason).into());
    }

    let order_number = generate_order_number(Utc::now().timestamp_millis());
    let new_order = build_order(user.id, cart.cart(), &shipping, &totals, order_number)?;
    let order = OrderRepository::new(state.pool()).create(&new_order).await?;

    cart.clear().await;
    checkout.complete(CompletedOrder {
        order_id: order.id,
        order_number: order.order_number,
        email: shipping.email,
        totals,
    });
    save_state(&session, &checkout).await?;

    info!(order_id = %order.id, payment_id = %charge.id, "Order placed");
    add_breadcrumb("checkout", "Order placed", None);
    Ok(view(session, checkout).await)
}
