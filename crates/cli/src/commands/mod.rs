//! CLI command implementations.
//!
//! Commands write their output to a caller-supplied `Write` so tests can
//! capture it.

pub mod cart;
pub mod products;

use fitgear_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

/// Format an amount in the storefront currency.
pub fn money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::USD).display()
}
