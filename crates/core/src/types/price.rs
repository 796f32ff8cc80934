//! Type-safe price representation using decimal arithmetic.
//!
//! The remote API reports every amount as a plain JSON number in Egyptian
//! pounds. Amounts are kept as [`Decimal`] so totals never pick up binary
//! floating point noise.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., pounds, not piastres).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub fn egp(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }

    /// A zero price in the default currency.
    #[must_use]
    pub fn zero() -> Self {
        Self::egp(Decimal::ZERO)
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.normalize(), self.currency_code.code())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EGP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// The three-letter code shown next to amounts.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EGP => "EGP",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_drops_trailing_zeros() {
        let price = Price::egp(Decimal::new(14_900, 2));
        assert_eq!(price.to_string(), "149 EGP");
    }

    #[test]
    fn test_display_keeps_fraction() {
        let price = Price::egp(Decimal::new(1_995, 1));
        assert_eq!(price.to_string(), "199.5 EGP");
    }

    #[test]
    fn test_times_multiplies_amount() {
        let price = Price::egp(Decimal::from(349)).times(3);
        assert_eq!(price.amount, Decimal::from(1047));
        assert_eq!(price.currency_code, CurrencyCode::EGP);
    }

    #[test]
    fn test_zero() {
        assert_eq!(Price::zero().to_string(), "0 EGP");
    }
}
