//! Catalogue API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS with `reqwest`
//! - The catalogue backend is the source of truth; nothing is stored locally
//! - In-memory caching via `moka` for products and categories (5 minute TTL)
//!
//! The client only fetches. Filtering and sorting run afterwards over the
//! fetched snapshot with `fitgear_core::filter_products`.
//!
//! # Example
//!
//! ```rust,ignore
//! use fitgear_storefront::catalogue::CatalogueClient;
//!
//! let client = CatalogueClient::new(&config.catalogue);
//!
//! let products = client.fetch_all_products(20).await?;
//! let visible = filter_products(&products, &filters, Some("trail"), SortKey::Featured);
//! ```

mod cache;
mod client;

pub use client::CatalogueClient;

use thiserror::Error;

/// Errors that can occur when talking to the catalogue API.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Backend answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },
}
