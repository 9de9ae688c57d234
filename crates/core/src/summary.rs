//! Order summary shown on the cart page.
//!
//! Subtotal comes from the cart. A promo code takes a percentage off the
//! subtotal, shipping is free above a threshold, and tax is charged on the
//! discounted subtotal.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::cart::{CartError, CartState};
use crate::types::round_money;

/// Orders with a subtotal strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(75, 0, 0, false, 0);

/// Flat shipping charge below the threshold (9.99).
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(999, 0, 0, false, 2);

/// Sales tax rate applied after discounts (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Errors from promo code handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    #[error("unknown promo code: {0}")]
    Unknown(String),
}

/// Promo codes accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PromoCode {
    /// 10% off the subtotal.
    Save10,
    /// 20% off the subtotal.
    Welcome20,
}

impl PromoCode {
    /// Fraction of the subtotal taken off.
    #[must_use]
    pub const fn rate(self) -> Decimal {
        match self {
            Self::Save10 => Decimal::from_parts(10, 0, 0, false, 2),
            Self::Welcome20 => Decimal::from_parts(20, 0, 0, false, 2),
        }
    }
}

impl std::fmt::Display for PromoCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save10 => write!(f, "SAVE10"),
            Self::Welcome20 => write!(f, "WELCOME20"),
        }
    }
}

impl std::str::FromStr for PromoCode {
    type Err = PromoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "save10" => Ok(Self::Save10),
            "welcome20" => Ok(Self::Welcome20),
            _ => Err(PromoError::Unknown(s.to_string())),
        }
    }
}

/// Money breakdown for a cart. All amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub promo: Option<PromoCode>,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// How much more to spend for free shipping, when below the threshold.
    pub free_shipping_remaining: Option<Decimal>,
}

impl OrderSummary {
    /// Compute the summary for a cart.
    ///
    /// An empty cart is all zeroes with no shipping charge.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the taxed total does not fit.
    pub fn compute(cart: &CartState, promo: Option<PromoCode>) -> Result<Self, CartError> {
        if cart.is_empty() {
            return Ok(Self {
                subtotal: Decimal::ZERO,
                promo,
                discount: Decimal::ZERO,
                shipping: Decimal::ZERO,
                tax: Decimal::ZERO,
                total: Decimal::ZERO,
                free_shipping_remaining: None,
            });
        }

        let subtotal = round_money(cart.total());
        let discount = match promo {
            Some(code) => round_money(
                subtotal
                    .checked_mul(code.rate())
                    .ok_or(CartError::Overflow)?,
            ),
            None => Decimal::ZERO,
        };
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING
        };
        let taxable = subtotal - discount;
        let tax = round_money(taxable.checked_mul(TAX_RATE).ok_or(CartError::Overflow)?);
        let total = taxable
            .checked_add(shipping)
            .and_then(|amount| amount.checked_add(tax))
            .ok_or(CartError::Overflow)?;
        let free_shipping_remaining =
            (subtotal < FREE_SHIPPING_THRESHOLD).then(|| FREE_SHIPPING_THRESHOLD - subtotal);

        Ok(Self {
            subtotal,
            promo,
            discount,
            shipping,
            tax,
            total,
            free_shipping_remaining,
        })
    }
}
