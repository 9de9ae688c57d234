//! Catalogue domain types.
//!
//! These mirror the JSON documents served by the catalogue backend. Field
//! names follow the backend's camelCase convention, and document ids are
//! carried in `_id`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BrandId, CategoryId, ProductId, ProductStatus, SubcategoryId};

// =============================================================================
// Envelopes
// =============================================================================

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Page size requested.
    pub limit: u32,
    /// Total number of matching documents.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl Pagination {
    /// Returns true if another page follows this one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// List envelope: `{ data: [...], pagination?: {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            pagination: None,
        }
    }
}

/// Single-resource envelope: `{ data: {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiItem<T> {
    pub data: T,
}

// =============================================================================
// Categories
// =============================================================================

/// A top-level catalogue category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A subcategory nested under a [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: SubcategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Category information embedded in a product when the backend expands it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Reference from a product to its category or subcategory.
///
/// The backend sends either the bare id or the expanded document depending
/// on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Expanded(CategorySummary),
}

impl CategoryRef {
    /// The referenced document id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Expanded(summary) => &summary.id,
        }
    }

    /// The slug, available only when expanded.
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Expanded(summary) => Some(&summary.slug),
        }
    }

    /// The display name, available only when expanded.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Expanded(summary) => Some(&summary.name),
        }
    }

    /// Returns true if `key` equals the id or the resolved slug.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.id() == key || self.slug() == Some(key)
    }
}

impl Default for CategoryRef {
    fn default() -> Self {
        Self::Id(String::new())
    }
}

// =============================================================================
// Products
// =============================================================================

/// Variant options and descriptive attributes of a product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductAttributes {
    /// Available sizes (e.g., `["S", "M", "L"]`).
    #[serde(default)]
    pub size: Vec<String>,
    /// Available colors (e.g., `["Black", "Navy"]`).
    #[serde(default)]
    pub color: Vec<String>,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub fit: String,
}

/// A product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub category_id: CategoryRef,
    #[serde(default)]
    pub subcategory_id: Option<CategoryRef>,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// List price.
    pub price: Decimal,
    /// Compare-at price, shown as the selling price when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_including_tax: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_rate: Option<Decimal>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: ProductAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_reviews: Option<u32>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The price shown to shoppers.
    ///
    /// The compare-at price wins when present; filtering and sorting both use
    /// this value so the displayed order never contradicts the price filter.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.compare_at_price.unwrap_or(self.price)
    }

    /// Returns true if at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Returns true if the product is archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.status.is_archived()
    }

    /// First image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

// =============================================================================
// Search
// =============================================================================

/// Brand reference embedded in a search hit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BrandRef {
    pub slug: String,
}

/// A result row from the backend's free-text search.
///
/// Search documents are flatter than [`Product`] and use `name` instead of
/// `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub brand: BrandRef,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_on_sale: Option<bool>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub num_reviews: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SearchHit {
    /// Sale price when the hit is on sale, otherwise the list price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match (self.is_on_sale, self.sale_price) {
            (Some(true), Some(sale)) => sale,
            _ => self.price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PRODUCT_JSON: &str = r#"{
        "_id": "68b6e1",
        "brandId": "b-1",
        "categoryId": { "_id": "c-1", "name": "Running", "slug": "running" },
        "subcategoryId": "s-9",
        "title": "Trail Tee",
        "slug": "trail-tee",
        "description": "Breathable tee",
        "images": ["https://cdn.example.com/tee.jpg"],
        "price": 39.99,
        "compareAtPrice": 29.99,
        "priceIncludingTax": 44.79,
        "taxAmount": 4.80,
        "gstRate": 12,
        "stock": 5,
        "status": "active",
        "tags": ["tee", "running"],
        "attributes": { "size": ["S", "M"], "color": ["Black"], "material": "Poly", "fit": "Slim" },
        "rating": 4.5,
        "numReviews": 12,
        "isFeatured": true,
        "createdAt": "2025-09-01T10:00:00.000Z",
        "updatedAt": "2025-09-02T10:00:00.000Z"
    }"#;

    #[test]
    fn test_product_deserializes_backend_document() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.id.as_str(), "68b6e1");
        assert_eq!(product.price, Decimal::new(3999, 2));
        assert_eq!(product.compare_at_price, Some(Decimal::new(2999, 2)));
        assert_eq!(product.category_id.slug(), Some("running"));
        assert_eq!(
            product.subcategory_id.as_ref().map(CategoryRef::id),
            Some("s-9")
        );
        assert_eq!(product.attributes.size, vec!["S", "M"]);
        assert!(product.is_featured);
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_product_minimal_document_uses_defaults() {
        let product: Product =
            serde_json::from_str(r#"{ "_id": "p", "title": "Cap", "price": 10 }"#).unwrap();
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.stock, 0);
        assert!(!product.is_featured);
        assert!(product.rating.is_none());
        assert_eq!(product.category_id, CategoryRef::Id(String::new()));
    }

    #[test]
    fn test_effective_price_prefers_compare_at() {
        let mut product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.effective_price(), Decimal::new(2999, 2));

        product.compare_at_price = None;
        assert_eq!(product.effective_price(), Decimal::new(3999, 2));
    }

    #[test]
    fn test_category_ref_matches_id_or_slug() {
        let bare = CategoryRef::Id("c-1".to_string());
        assert!(bare.matches("c-1"));
        assert!(!bare.matches("running"));

        let expanded = CategoryRef::Expanded(CategorySummary {
            id: "c-1".to_string(),
            name: "Running".to_string(),
            slug: "running".to_string(),
        });
        assert!(expanded.matches("c-1"));
        assert!(expanded.matches("running"));
        assert_eq!(expanded.name(), Some("Running"));
    }

    #[test]
    fn test_envelope_with_and_without_pagination() {
        let with: ApiResponse<Category> = serde_json::from_str(
            r#"{
                "data": [{ "_id": "c-1", "name": "Running", "slug": "running", "image": "x.png" }],
                "pagination": { "page": 1, "limit": 20, "total": 41, "totalPages": 3 }
            }"#,
        )
        .unwrap();
        assert_eq!(with.data.len(), 1);
        assert!(with.pagination.unwrap().has_next_page());

        let without: ApiResponse<Category> = serde_json::from_str(r#"{ "data": [] }"#).unwrap();
        assert!(without.data.is_empty());
        assert!(without.pagination.is_none());
    }

    #[test]
    fn test_search_hit_deserializes() {
        let hit: SearchHit = serde_json::from_str(
            r#"{
                "_id": "68b6e1",
                "name": "Trail Tee",
                "slug": "trail-tee",
                "price": 39.99,
                "images": [],
                "brand": { "slug": "sportswear" },
                "isOnSale": true,
                "salePrice": 24.99,
                "__v": 0
            }"#,
        )
        .unwrap();
        assert_eq!(hit.brand.slug, "sportswear");
        assert_eq!(hit.effective_price(), Decimal::new(2499, 2));
    }
}
