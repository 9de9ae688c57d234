//! Catalogue API client implementation.
//!
//! Caches products and categories using `moka` (5-minute TTL). Search is
//! never cached.

use std::sync::Arc;
use std::time::Duration;

use fitgear_core::{ApiItem, ApiResponse, Category, Product, SearchHit, Subcategory};
use moka::future::Cache;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::CatalogueError;
use super::cache::{CacheKey, CacheValue};
use crate::config::{CatalogueConfig, bearer};

/// Upper bound on pages walked for one listing.
const MAX_PAGES: u32 = 500;

/// Number of body characters kept in error messages.
const ERROR_BODY_CHARS: usize = 200;

// =============================================================================
// CatalogueClient
// =============================================================================

/// Client for the catalogue API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogueClient {
    inner: Arc<CatalogueClientInner>,
}

struct CatalogueClientInner {
    client: reqwest::Client,
    base_url: Url,
    brand: String,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

/// A paged product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing<'a> {
    /// Every product of the brand.
    Brand,
    /// Products of one subcategory.
    Subcategory {
        category: &'a str,
        subcategory: &'a str,
    },
}

impl Listing<'_> {
    fn cache_key(self, page: u32, limit: u32) -> CacheKey {
        match self {
            Self::Brand => CacheKey::Products { page, limit },
            Self::Subcategory {
                category,
                subcategory,
            } => CacheKey::SubcategoryProducts {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
                page,
                limit,
            },
        }
    }
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authorized,
}

impl CatalogueClient {
    /// Create a new catalogue API client.
    #[must_use]
    pub fn new(config: &CatalogueConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogueClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                brand: config.brand.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        }
    }

    /// Brand slug this client is scoped to.
    #[must_use]
    pub fn brand(&self) -> &str {
        &self.inner.brand
    }

    /// Build an endpoint URL from path segments (each one percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogueError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogueError::Url(url::ParseError::RelativeUrlWithoutBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Perform a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        access: Access,
    ) -> Result<T, CatalogueError> {
        let mut request = self
            .inner
            .client
            .get(url.clone())
            .header("Accept", "application/json");
        if access == Access::Authorized
            && let Some(token) = &self.inner.api_token
        {
            request = request.header("Authorization", bearer(token));
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogueError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogueError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %body.chars().take(500).collect::<String>(),
                "Catalogue API returned non-success status"
            );
            return Err(CatalogueError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalogue response"
            );
            CatalogueError::Parse(e)
        })
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List the brand's categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(brand = %self.inner.brand))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogueError> {
        let cache_key = CacheKey::Categories;
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint(&["brands", &self.inner.brand, "categories"])?;
        let response: ApiResponse<Category> = self.get_json(url, Access::Authorized).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(response.data.clone()))
            .await;
        Ok(response.data)
    }

    /// List the subcategories of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(brand = %self.inner.brand))]
    pub async fn list_subcategories(
        &self,
        category_slug: &str,
    ) -> Result<Vec<Subcategory>, CatalogueError> {
        let cache_key = CacheKey::Subcategories(category_slug.to_string());
        if let Some(CacheValue::Subcategories(subcategories)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for subcategories");
            return Ok(subcategories);
        }

        let url = self.endpoint(&[
            "brands",
            &self.inner.brand,
            "categories",
            category_slug,
            "subcategories",
        ])?;
        let response: ApiResponse<Subcategory> = self.get_json(url, Access::Authorized).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Subcategories(response.data.clone()))
            .await;
        Ok(response.data)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get one page of the brand's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(brand = %self.inner.brand))]
    pub async fn list_products(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<ApiResponse<Product>, CatalogueError> {
        self.list_page(Listing::Brand, page, limit).await
    }

    /// Get one page of products in a subcategory.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(brand = %self.inner.brand))]
    pub async fn list_subcategory_products(
        &self,
        category_slug: &str,
        subcategory_slug: &str,
        page: u32,
        limit: u32,
    ) -> Result<ApiResponse<Product>, CatalogueError> {
        let listing = Listing::Subcategory {
            category: category_slug,
            subcategory: subcategory_slug,
        };
        self.list_page(listing, page, limit).await
    }

    /// Build the URL of one listing page.
    fn listing_url(
        &self,
        listing: Listing<'_>,
        page: u32,
        limit: u32,
    ) -> Result<Url, CatalogueError> {
        let brand = self.inner.brand.as_str();
        let mut url = match listing {
            Listing::Brand => self.endpoint(&["admin", "brands", brand, "products"])?,
            Listing::Subcategory {
                category,
                subcategory,
            } => self.endpoint(&[
                "admin",
                "brands",
                brand,
                "categories",
                category,
                "subcategories",
                subcategory,
                "products",
            ])?,
        };
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    async fn list_page(
        &self,
        listing: Listing<'_>,
        page: u32,
        limit: u32,
    ) -> Result<ApiResponse<Product>, CatalogueError> {
        let cache_key = listing.cache_key(page, limit);
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!(?listing, page, "Cache hit for products");
            return Ok(products);
        }

        let url = self.listing_url(listing, page, limit)?;
        let response: ApiResponse<Product> = self.get_json(url, Access::Authorized).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(response.clone()))
            .await;
        Ok(response)
    }

    /// Walk the pages of a listing until the backend reports no more.
    async fn walk(
        &self,
        listing: Listing<'_>,
        limit: u32,
    ) -> Result<Vec<Product>, CatalogueError> {
        let mut products = Vec::new();
        for page in 1..=MAX_PAGES {
            let response = self.list_page(listing, page, limit).await?;
            let fetched = response.data.len();
            products.extend(response.data);

            let more = response
                .pagination
                .is_some_and(|pagination| pagination.has_next_page());
            if fetched == 0 || !more {
                break;
            }
        }
        debug!(?listing, count = products.len(), "Fetched product snapshot");
        Ok(products)
    }

    /// Get a product by id from the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError::NotFound` if the product does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: &str) -> Result<Product, CatalogueError> {
        let cache_key = CacheKey::Product(product_id.to_string());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", product_id])?;
        let item: ApiItem<Product> = self.get_json(url, Access::Public).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(item.data.clone())))
            .await;
        Ok(item.data)
    }

    /// Walk every page of the brand's products.
    ///
    /// This is the snapshot the filter pipeline runs over.
    ///
    /// # Errors
    ///
    /// Returns the first page error encountered.
    #[instrument(skip(self), fields(brand = %self.inner.brand))]
    pub async fn fetch_all_products(&self, limit: u32) -> Result<Vec<Product>, CatalogueError> {
        self.walk(Listing::Brand, limit).await
    }

    /// Walk every page of one subcategory's products.
    ///
    /// # Errors
    ///
    /// Returns the first page error encountered.
    #[instrument(skip(self), fields(brand = %self.inner.brand))]
    pub async fn fetch_subcategory_products(
        &self,
        category_slug: &str,
        subcategory_slug: &str,
        limit: u32,
    ) -> Result<Vec<Product>, CatalogueError> {
        let listing = Listing::Subcategory {
            category: category_slug,
            subcategory: subcategory_slug,
        };
        self.walk(listing, limit).await
    }

    /// Free-text search on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CatalogueError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("q", query);
        let response: ApiResponse<SearchHit> = self.get_json(url, Access::Public).await?;
        Ok(response.data)
    }
}
