//! Type-safe price representation using decimal arithmetic.
//!
//! Catalogue prices arrive as plain decimal amounts. [`Price`] pairs an
//! amount with a currency for display, and [`round_money`] is the single
//! rounding rule applied to every derived money value (discounts, tax,
//! totals).

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places money values are rounded to.
pub const MONEY_SCALE: u32 = 2;

/// Round a money amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
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

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let amount = round_money(self.amount);
        if amount.is_sign_negative() {
            format!("-{}{:.2}", self.currency_code.symbol(), amount.abs())
        } else {
            format!("{}{:.2}", self.currency_code.symbol(), amount)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    INR,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::INR => "₹",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(1_005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(-1_005, 3)), Decimal::new(-101, 2));
        assert_eq!(round_money(Decimal::new(72, 1)), Decimal::new(720, 2));
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(5999, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$59.99");

        let whole = Price::new(Decimal::from(10), CurrencyCode::INR);
        assert_eq!(whole.to_string(), "₹10.00");
    }

    #[test]
    fn test_display_negative() {
        let price = Price::new(Decimal::new(-1000, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "-$10.00");
    }
}
