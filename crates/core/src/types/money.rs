//! Money helpers for the checkout flow.
//!
//! The catalog prices and cart totals are kept in the store's base currency
//! (Colombian pesos in production). The payment provider settles in USD, so
//! checkout converts the cart total with a fixed exchange rate from
//! configuration and formats it the way the provider expects: a plain decimal
//! string with exactly two fraction digits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fixed base-currency to settlement-currency exchange rate.
///
/// The rate is multiplicative: `settlement = base × rate`. With the
/// production rate of `0.00025`, a cart total of `100000` COP becomes
/// `25.00` USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// Create a new exchange rate.
    #[must_use]
    pub const fn new(rate: Decimal) -> Self {
        Self(rate)
    }

    /// Convert a base-currency amount to the settlement currency,
    /// rounded to two decimal places (banker's rounding is not used;
    /// amounts round half away from zero, matching the provider).
    #[must_use]
    pub fn convert(&self, base_amount: Decimal) -> Decimal {
        (base_amount * self.0).round_dp_with_strategy(
            2,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        )
    }

    /// The raw rate value.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.0
    }
}

/// Format a monetary amount as the provider wire format: two fraction
/// digits, no thousands separators, no currency symbol (e.g. `"25.00"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn converts_at_fixed_rate() {
        let rate = ExchangeRate::new(dec("0.00025"));
        assert_eq!(rate.convert(dec("100000")), dec("25.00"));
    }

    #[test]
    fn conversion_rounds_to_two_decimals() {
        let rate = ExchangeRate::new(dec("0.00025"));
        // 12345 * 0.00025 = 3.08625 -> 3.09
        assert_eq!(rate.convert(dec("12345")), dec("3.09"));
    }

    #[test]
    fn formats_with_two_fraction_digits() {
        assert_eq!(format_amount(dec("25")), "25.00");
        assert_eq!(format_amount(dec("25.5")), "25.50");
        assert_eq!(format_amount(dec("0")), "0.00");
    }

    #[test]
    fn cart_total_formats_as_provider_amount() {
        let rate = ExchangeRate::new(dec("0.00025"));
        assert_eq!(format_amount(rate.convert(dec("100000"))), "25.00");
    }
}
