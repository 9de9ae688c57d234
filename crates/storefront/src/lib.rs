//! FitGear Storefront library.
//!
//! Everything in the storefront that touches the outside world: environment
//! configuration, cart persistence, and the catalogue API client. The pure
//! cart and filter logic lives in `fitgear_core`.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`storage`] - Key-value backends for the persisted cart
//! - [`cart_store`] - Cart state holder that persists after every action
//! - [`catalogue`] - HTTP client for the catalogue API
//! - [`error`] - Unified error type with Sentry reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart_store;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod storage;

pub use cart_store::{CartStore, LoadOutcome, SubscriptionId};
pub use catalogue::{CatalogueClient, CatalogueError};
pub use config::{CatalogueConfig, ConfigError, StorefrontConfig};
pub use error::{AppError, Result};
pub use storage::{CART_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};
