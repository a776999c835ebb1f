//! `/api/payments`: two-step charges against the mock gateway.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::payment::{PaymentIntent, PaymentProvider, PaymentResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub payment_intent_id: Option<String>,
}

/// `POST /api/payments/intent { amount, currency? }`
pub async fn create_intent(
    State(state): State<AppState>,
    Json(body): Json<IntentRequest>,
) -> Result<Json<PaymentIntent>> {
    let amount = body
        .amount
        .filter(|a| *a > Decimal::ZERO)
        .ok_or_else(|| AppError::BadRequest("Valid amount is required".to_owned()))?;
    let currency = body.currency.unwrap_or_else(|| "usd".to_owned());

    let intent = state
        .payments()
        .create_payment_intent(amount, &currency)
        .await;
    Ok(Json(intent))
}

/// `POST /api/payments/confirm { paymentIntentId }`
///
/// Declines are reported in the body with `status: "failed"`, not as errors.
pub async fn confirm(
    State(state): State<AppState>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<PaymentResult>> {
    let intent_id = body
        .payment_intent_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Payment intent ID is required".to_owned()))?;

    let result = state.payments().confirm_payment(&intent_id).await;
    info!(id = %result.id, status = ?result.status, "Payment confirmed");
    Ok(Json(result))
}
