//! FitGear Core - cart, catalogue and filtering logic.
//!
//! This crate provides the in-memory heart of the storefront, used by:
//! - `storefront` - Cart persistence and the catalogue API client
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and statuses
//! - [`catalogue`] - Products, categories and API envelopes
//! - [`cart`] - Cart state and the reducer that mutates it
//! - [`filter`] - Product filter/sort pipeline
//! - [`summary`] - Order summary (promo codes, shipping, tax)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalogue;
pub mod filter;
pub mod summary;
pub mod types;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use cart::{CartAction, CartError, CartLineItem, CartState, LineKey, reduce};
pub use catalogue::{
    ApiItem, ApiResponse, BrandRef, Category, CategoryRef, CategorySummary, Pagination, Product,
    ProductAttributes, SearchHit, Subcategory,
};
pub use filter::{FilterState, PriceRange, SortKey, filter_products};
pub use summary::{OrderSummary, PromoCode, PromoError};
pub use types::*;
