//! Cache types for catalogue API responses.

use fitgear_core::{ApiResponse, Category, Product, Subcategory};

/// Cache key for products and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products { page: u32, limit: u32 },
    SubcategoryProducts {
        category: String,
        subcategory: String,
        page: u32,
        limit: u32,
    },
    Categories,
    Subcategories(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ApiResponse<Product>),
    Categories(Vec<Category>),
    Subcategories(Vec<Subcategory>),
}
