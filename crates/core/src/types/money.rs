//! Money formatting and discount helpers.
//!
//! Prices are carried as [`Decimal`] dollars end to end; these helpers only
//! turn them into display values.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

/// Format a dollar amount as `$1,234.56`.
///
/// Rounds half away from zero to cents and groups thousands.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Whole-percent saving of `price` against `compare_price`.
///
/// `None` when there is no compare price or it is not above the price.
#[must_use]
pub fn discount_percentage(price: Decimal, compare_price: Option<Decimal>) -> Option<u32> {
    let compare = compare_price.filter(|c| *c > price && !c.is_zero())?;
    let pct = ((compare - price) / compare * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    pct.to_u32()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(d("10")), "$10.00");
        assert_eq!(format_currency(d("10.5")), "$10.50");
        assert_eq!(format_currency(d("10.555")), "$10.56");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(d("1234.5")), "$1,234.50");
        assert_eq!(format_currency(d("38700")), "$38,700.00");
        assert_eq!(format_currency(d("1000000")), "$1,000,000.00");
        assert_eq!(format_currency(d("-25")), "-$25.00");
    }

    #[test]
    fn test_discount_percentage() {
        assert_eq!(discount_percentage(d("10"), Some(d("20"))), Some(50));
        assert_eq!(discount_percentage(d("15"), Some(d("20"))), Some(25));
        assert_eq!(discount_percentage(d("19"), Some(d("20"))), Some(5));
    }

    #[test]
    fn test_discount_percentage_none() {
        assert_eq!(discount_percentage(d("20"), Some(d("10"))), None);
        assert_eq!(discount_percentage(d("20"), Some(d("20"))), None);
        assert_eq!(discount_percentage(d("20"), None), None);
    }
}
