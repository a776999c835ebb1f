//! Simulated payment provider.
//!
//! No money moves. Calls sleep to mimic gateway latency and succeed at a
//! fixed rate, so checkout exercises both the happy path and declines.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::PaymentConfig;

const PROCESS_LATENCY: Duration = Duration::from_millis(1500);
const INTENT_LATENCY: Duration = Duration::from_millis(500);
const CONFIRM_LATENCY: Duration = Duration::from_millis(1000);

/// Outcome of a charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
    Processing,
}

/// What the provider reports for a charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub id: String,
    pub status: PaymentOutcome,
    pub amount: Decimal,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentResult {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == PaymentOutcome::Succeeded
    }
}

/// A payment intent awaiting confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// A payment gateway.
pub trait PaymentProvider: Send + Sync {
    /// Charge `amount` in one step.
    fn process_payment(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> impl Future<Output = PaymentResult> + Send;

    /// Reserve a charge to be confirmed later.
    fn create_payment_intent(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> impl Future<Output = PaymentIntent> + Send;

    /// Confirm an intent created earlier.
    fn confirm_payment(&self, intent_id: &str) -> impl Future<Output = PaymentResult> + Send;
}

/// In-process gateway with randomized declines.
#[derive(Debug, Clone)]
pub struct MockPaymentProvider {
    delay_scale: f64,
    process_success_rate: f64,
    confirm_success_rate: f64,
}

impl MockPaymentProvider {
    #[must_use]
    pub const fn new(config: PaymentConfig) -> Self {
        Self {
            delay_scale: config.delay_scale,
            process_success_rate: 0.9,
            confirm_success_rate: 0.95,
        }
    }

    /// Override both success rates, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_success_rate(mut self, rate: f64) -> Self {
        let rate = rate.clamp(0.0, 1.0);
        self.process_success_rate = rate;
        self.confirm_success_rate = rate;
        self
    }

    async fn simulate_latency(&self, base: Duration) {
        if self.delay_scale > 0.0 {
            tokio::time::sleep(base.mul_f64(self.delay_scale)).await;
        }
    }

    fn roll(rate: f64) -> bool {
        rand::rng().random_bool(rate)
    }
}

impl PaymentProvider for MockPaymentProvider {
    #[instrument(skip(self))]
    async fn process_payment(&self, amount: Decimal, currency: &str) -> PaymentResult {
        self.simulate_latency(PROCESS_LATENCY).await;

        let id = format!("pay_{}", random_base36(9));
        if Self::roll(self.process_success_rate) {
            info!(payment_id = %id, "Mock payment succeeded");
            PaymentResult {
                receipt_url: Some(format!("https://example.com/receipt/{id}")),
                id,
                status: PaymentOutcome::Succeeded,
                amount,
                currency: currency.to_owned(),
                error: None,
            }
        } else {
            warn!(payment_id = %id, "Mock payment declined");
            PaymentResult {
                id,
                status: PaymentOutcome::Failed,
                amount,
                currency: currency.to_owned(),
                receipt_url: None,
                error: Some("Insufficient funds".to_owned()),
            }
        }
    }

    #[instrument(skip(self))]
    async fn create_payment_intent(&self, amount: Decimal, currency: &str) -> PaymentIntent {
        self.simulate_latency(INTENT_LATENCY).await;

        let id = format!("pi_{}", random_base36(9));
        let client_secret = format!("{id}_secret_{}", random_base36(24));
        PaymentIntent { id, client_secret }
    }

    #[instrument(skip(self))]
    async fn confirm_payment(&self, intent_id: &str) -> PaymentResult {
        self.simulate_latency(CONFIRM_LATENCY).await;

        let id = format!("pay_{}", random_base36(9));
        let succeeded = Self::roll(self.confirm_success_rate);
        PaymentResult {
            receipt_url: succeeded.then(|| format!("https://example.com/receipt/{id}")),
            id,
            status: if succeeded {
                PaymentOutcome::Succeeded
            } else {
                PaymentOutcome::Failed
            },
            amount: Decimal::ZERO,
            currency: "usd".to_owned(),
            error: (!succeeded).then(|| "Payment declined by issuer".to_owned()),
        }
    }
}

/// Lowercase letters and digits.
fn random_base36(len: usize) -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    (0..len)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> MockPaymentProvider {
        MockPaymentProvider::new(PaymentConfig { delay_scale: 0.0 })
    }

    #[tokio::test]
    async fn test_process_payment_success() {
        let provider = instant().with_success_rate(1.0);
        let result = provider.process_payment(Decimal::new(12_999, 2), "usd").await;

        assert!(result.succeeded());
        assert!(result.id.starts_with("pay_"));
        assert_eq!(result.id.len(), 13);
        assert_eq!(
            result.receipt_url.as_deref(),
            Some(format!("https://example.com/receipt/{}", result.id).as_str())
        );
        assert_eq!(result.amount, Decimal::new(12_999, 2));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_process_payment_decline() {
        let provider = instant().with_success_rate(0.0);
        let result = provider.process_payment(Decimal::ONE, "usd").await;

        assert_eq!(result.status, PaymentOutcome::Failed);
        assert_eq!(result.error.as_deref(), Some("Insufficient funds"));
        assert!(result.receipt_url.is_none());
    }

    #[tokio::test]
    async fn test_payment_intent_shape() {
        let intent = instant().create_payment_intent(Decimal::TEN, "usd").await;
        assert!(intent.id.starts_with("pi_"));
        let (prefix, secret) = intent.client_secret.split_once("_secret_").unwrap_or_default();
        assert_eq!(prefix, intent.id);
        assert_eq!(secret.len(), 24);
    }

    #[tokio::test]
    async fn test_confirm_payment_decline_message() {
        let provider = instant().with_success_rate(0.0);
        let result = provider.confirm_payment("pi_abc").await;
        assert_eq!(result.error.as_deref(), Some("Payment declined by issuer"));
        assert_eq!(result.currency, "usd");
    }

    #[test]
    fn test_result_serializes_snake_case_status() {
        let result = PaymentResult {
            id: "pay_1".to_owned(),
            status: PaymentOutcome::Succeeded,
            amount: Decimal::ONE,
            currency: "usd".to_owned(),
            receipt_url: None,
            error: None,
        };
        let json = serde_json::to_value(&result).unwrap_or_default();
        assert_eq!(json["status"], "succeeded");
        assert!(json.get("error").is_none());
    }
}
