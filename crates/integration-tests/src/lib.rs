//! Integration tests for the FitGear storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Offline tests (file-backed cart, pipeline over a catalogue snapshot)
//! cargo test -p fitgear-integration-tests
//!
//! # Include tests that call the live catalogue API
//! cargo test -p fitgear-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart store over real files in a temp directory
//! - `storefront_flow` - Filter, add to cart, summarise
//! - `catalogue_api` - Live catalogue API (ignored by default)

use fitgear_core::Product;
use fitgear_storefront::CatalogueConfig;

/// Catalogue snapshot shaped like a backend list response.
pub const CATALOGUE_JSON: &str = r#"{
    "data": [
        {
            "_id": "p-archived",
            "categoryId": { "_id": "c-run", "name": "Running", "slug": "running" },
            "title": "Old Trail Tee",
            "price": 19.99,
            "stock": 4,
            "status": "archived",
            "tags": ["tee"]
        },
        {
            "_id": "p-tee",
            "categoryId": { "_id": "c-run", "name": "Running", "slug": "running" },
            "subcategoryId": { "_id": "s-tops", "name": "Tops", "slug": "tops" },
            "title": "Trail Tee",
            "description": "Breathable running tee",
            "price": 39.99,
            "compareAtPrice": 29.99,
            "stock": 12,
            "status": "active",
            "tags": ["tee", "running"],
            "attributes": { "size": ["S", "M", "L"], "color": ["Black", "Navy"] },
            "rating": 4.6,
            "numReviews": 31,
            "isFeatured": true,
            "createdAt": "2025-08-01T00:00:00.000Z"
        },
        {
            "_id": "p-shorts",
            "categoryId": { "_id": "c-run", "name": "Running", "slug": "running" },
            "title": "Split Shorts",
            "price": 45.00,
            "stock": 0,
            "status": "active",
            "attributes": { "size": ["M"], "color": ["Black"] },
            "rating": 4.1,
            "createdAt": "2025-09-10T00:00:00.000Z"
        },
        {
            "_id": "p-mat",
            "categoryId": "c-yoga",
            "title": "Studio Mat",
            "description": "Grippy yoga mat",
            "price": 68.00,
            "stock": 7,
            "status": "active",
            "tags": ["yoga"],
            "attributes": { "color": ["Sage"] },
            "createdAt": "2025-09-20T00:00:00.000Z"
        }
    ],
    "pagination": { "page": 1, "limit": 20, "total": 4, "totalPages": 1 }
}"#;

/// Products from [`CATALOGUE_JSON`].
///
/// # Panics
///
/// Panics if the fixture does not parse.
#[must_use]
#[allow(clippy::expect_used)]
pub fn catalogue() -> Vec<Product> {
    let response: fitgear_core::ApiResponse<Product> =
        serde_json::from_str(CATALOGUE_JSON).expect("catalogue fixture parses");
    response.data
}

/// Catalogue configuration for live tests.
///
/// Reads the same environment variables as the CLI.
///
/// # Panics
///
/// Panics if the environment does not describe a valid configuration.
#[must_use]
#[allow(clippy::expect_used)]
pub fn live_catalogue_config() -> CatalogueConfig {
    fitgear_storefront::StorefrontConfig::from_env()
        .expect("catalogue configuration from environment")
        .catalogue
}
