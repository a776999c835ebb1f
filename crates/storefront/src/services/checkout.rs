//! Checkout: shipping, then payment, then complete.
//!
//! Progress is kept in the session as a [`CheckoutState`]. The state machine
//! only moves forward from shipping to payment to complete; "Back" returns
//! from payment to shipping.

use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use luxe_jewel_core::{Cart, OrderId, UserId};

use crate::models::{NewOrder, NewOrderItem};

/// Currency charged at checkout.
pub const CHECKOUT_CURRENCY: &str = "usd";

/// Payment method recorded on orders placed through checkout.
pub const CHECKOUT_PAYMENT_METHOD: &str = "mock-card";

/// Orders above this subtotal ship free.
const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
/// Flat shipping charge below the threshold.
const FLAT_SHIPPING: Decimal = Decimal::from_parts(25, 0, 0, false, 0);
/// Sales tax, 8 %.
const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("checkout is at the {actual} step, expected {expected}")]
    WrongStep {
        expected: CheckoutStep,
        actual: CheckoutStep,
    },

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Payment failed: {0}")]
    PaymentFailed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Complete,
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Complete => "complete",
        })
    }
}

fn default_country() -> String {
    "United States".to_owned()
}

fn require(value: &str, field: &'static str) -> Result<(), CheckoutError> {
    if value.trim().is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    Ok(())
}

/// Where the order ships. Also used as the billing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl ShippingInfo {
    /// Every field except `phone` must be filled in.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first empty field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        require(&self.first_name, "First name")?;
        require(&self.last_name, "Last name")?;
        require(&self.email, "Email")?;
        require(&self.address, "Address")?;
        require(&self.city, "City")?;
        require(&self.state, "State")?;
        require(&self.zip, "ZIP code")?;
        require(&self.country, "Country")
    }
}

/// Card details. Only checked for presence; nothing is stored.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub card_number: String,
    pub card_name: String,
    pub expiry: String,
    pub cvv: String,
}

impl std::fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("card_name", &self.card_name)
            .finish_non_exhaustive()
    }
}

impl PaymentInfo {
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first empty field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        require(&self.card_number, "Card number")?;
        require(&self.card_name, "Name on card")?;
        require(&self.expiry, "Expiry date")?;
        require(&self.cvv, "CVV")
    }
}

/// Money owed for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Free shipping above $500, otherwise $25; 8 % tax on the subtotal.
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING
        };
        let tax = (subtotal * TAX_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// What the confirmation step shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedOrder {
    pub order_id: OrderId,
    pub order_number: String,
    pub email: String,
    pub totals: OrderTotals,
}

/// Session-stored checkout progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    pub step: CheckoutStep,
    pub shipping: Option<ShippingInfo>,
    pub last_order: Option<CompletedOrder>,
}

impl CheckoutState {
    /// Record shipping details and move to payment.
    ///
    /// A finished checkout starts over.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` if the details are incomplete.
    pub fn submit_shipping(&mut self, info: ShippingInfo) -> Result<(), CheckoutError> {
        info.validate()?;
        if self.step == CheckoutStep::Complete {
            self.last_order = None;
        }
        self.shipping = Some(info);
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Return from payment to shipping. Other steps are left alone.
    pub fn back(&mut self) {
        if self.step == CheckoutStep::Payment {
            self.step = CheckoutStep::Shipping;
        }
    }

    /// The shipping details to charge against, if payment may be taken now.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` outside the payment step.
    pub fn ready_for_payment(&self) -> Result<&ShippingInfo, CheckoutError> {
        match (&self.step, &self.shipping) {
            (CheckoutStep::Payment, Some(shipping)) => Ok(shipping),
            (actual, _) => Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Payment,
                actual: *actual,
            }),
        }
    }

    pub fn complete(&mut self, order: CompletedOrder) {
        self.step = CheckoutStep::Complete;
        self.last_order = Some(order);
    }

    /// Whether an empty cart should send the visitor back to `/cart`.
    #[must_use]
    pub fn needs_cart(&self, cart: &Cart) -> bool {
        cart.is_empty() && self.step != CheckoutStep::Complete
    }
}

/// `ORD-{unix millis}-{0..10000}`.
#[must_use]
pub fn generate_order_number(unix_millis: i64) -> String {
    let suffix = rand::rng().random_range(0..10_000);
    format!("ORD-{unix_millis}-{suffix}")
}

/// The order to insert for a paid cart.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if there is nothing to order.
pub fn build_order(
    user_id: UserId,
    cart: &Cart,
    shipping: &ShippingInfo,
    totals: &OrderTotals,
    order_number: String,
) -> Result<NewOrder, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let address = serde_json::to_value(shipping).ok();
    Ok(NewOrder {
        user_id: Some(user_id),
        order_number,
        shipping_address: address.clone(),
        billing_address: address,
        items: cart
            .items()
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                variant_id: None,
                quantity: item.quantity,
                price: item.product.price,
            })
            .collect(),
        subtotal: totals.subtotal,
        tax_amount: totals.tax,
        shipping_amount: totals.shipping,
        discount_amount: Decimal::ZERO,
        total_amount: totals.total,
        payment_method: CHECKOUT_PAYMENT_METHOD.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luxe_jewel_core::{ProductId, ProductSnapshot};

    use super::*;

    fn shipping() -> ShippingInfo {
        serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "address": "12 St James's Square",
            "city": "London",
            "state": "LN",
            "zip": "SW1Y 4JH"
        }))
        .unwrap()
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(
            ProductSnapshot {
                id: ProductId::new(7),
                name: "Emerald Pendant".to_owned(),
                slug: "emerald-pendant".to_owned(),
                price: Decimal::new(24_950, 2),
                compare_price: None,
                featured_image: None,
                category_id: None,
            },
            2,
        );
        cart
    }

    #[test]
    fn test_totals() {
        let small = OrderTotals::for_subtotal(Decimal::new(100, 0));
        assert_eq!(small.shipping, Decimal::new(25, 0));
        assert_eq!(small.tax, Decimal::new(800, 2));
        assert_eq!(small.total, Decimal::new(13_300, 2));

        let at_threshold = OrderTotals::for_subtotal(Decimal::new(500, 0));
        assert_eq!(at_threshold.shipping, Decimal::new(25, 0));

        let large = OrderTotals::for_subtotal(Decimal::new(49_900, 2));
        assert_eq!(large.shipping, Decimal::new(25, 0));
        let free = OrderTotals::for_subtotal(Decimal::new(50_001, 2));
        assert_eq!(free.shipping, Decimal::ZERO);
        assert_eq!(free.tax, Decimal::new(4_000, 2));
    }

    #[test]
    fn test_shipping_defaults_and_validation() {
        let info = shipping();
        assert_eq!(info.country, "United States");
        assert!(info.phone.is_none());
        assert!(info.validate().is_ok());

        let missing_city = ShippingInfo {
            city: "  ".to_owned(),
            ..info
        };
        assert_eq!(
            missing_city.validate(),
            Err(CheckoutError::MissingField("City"))
        );
    }

    #[test]
    fn test_payment_validation() {
        let payment = PaymentInfo {
            card_number: "4242 4242 4242 4242".to_owned(),
            card_name: "Ada Lovelace".to_owned(),
            expiry: "12/30".to_owned(),
            cvv: String::new(),
        };
        assert_eq!(payment.validate(), Err(CheckoutError::MissingField("CVV")));
        assert!(!format!("{payment:?}").contains("4242"));
    }

    #[test]
    fn test_step_transitions() {
        let mut state = CheckoutState::default();
        assert!(matches!(
            state.ready_for_payment(),
            Err(CheckoutError::WrongStep { actual: CheckoutStep::Shipping, .. })
        ));

        state.submit_shipping(shipping()).unwrap();
        assert_eq!(state.step, CheckoutStep::Payment);
        assert!(state.ready_for_payment().is_ok());

        state.back();
        assert_eq!(state.step, CheckoutStep::Shipping);
        assert!(state.shipping.is_some());

        state.submit_shipping(shipping()).unwrap();
        state.complete(CompletedOrder {
            order_id: OrderId::new(1),
            order_number: "ORD-1-1".to_owned(),
            email: "ada@example.com".to_owned(),
            totals: OrderTotals::for_subtotal(Decimal::new(100, 0)),
        });
        state.back();
        assert_eq!(state.step, CheckoutStep::Complete);
        assert!(!state.needs_cart(&Cart::new()));

        state.submit_shipping(shipping()).unwrap();
        assert!(state.last_order.is_none());
        assert!(state.needs_cart(&Cart::new()));
    }

    #[test]
    fn test_build_order() {
        let totals = OrderTotals::for_subtotal(cart().subtotal());
        let order = build_order(UserId::new(3), &cart(), &shipping(), &totals, "ORD-1-2".to_owned())
            .unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items.first().unwrap().quantity, 2);
        assert_eq!(order.payment_method, "mock-card");
        assert_eq!(order.total_amount, Decimal::new(56_392, 2));
        assert_eq!(
            order.shipping_address.unwrap().get("firstName").unwrap(),
            "Ada"
        );

        assert_eq!(
            build_order(UserId::new(3), &Cart::new(), &shipping(), &totals, String::new()).unwrap_err(),
            CheckoutError::EmptyCart
        );
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number(1_700_000_000_000);
        let suffix = number.strip_prefix("ORD-1700000000000-").unwrap();
        assert!(suffix.parse::<u32>().unwrap() < 10_000);
    }
}
