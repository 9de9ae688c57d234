//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for everything the storefront library
//! can fail with. Front ends call [`AppError::report`] before showing the
//! error so unexpected failures reach Sentry.

use fitgear_core::{CartError, PromoError};
use thiserror::Error;

use crate::catalogue::CatalogueError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cart storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalogue API operation failed.
    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    /// Cart action was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Promo code was not recognised.
    #[error("Promo error: {0}")]
    Promo(#[from] PromoError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Writing command output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    /// Whether the error was caused by user input rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Cart(_)
                | Self::Promo(_)
                | Self::NotFound(_)
                | Self::BadRequest(_)
                | Self::Catalogue(CatalogueError::NotFound(_))
        )
    }

    /// Log the error and capture system failures to Sentry.
    pub fn report(&self) {
        if self.is_user_error() {
            tracing::warn!(error = %self, "Request rejected");
            return;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Command failed"
        );
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "ADD_ITEM", Some(&[("product_id", "68b6e1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
