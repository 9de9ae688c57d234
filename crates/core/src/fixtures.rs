//! Test builders shared by unit tests across the workspace.
//!
//! Compiled only for this crate's tests or with the `test-fixtures` feature.

use rust_decimal::Decimal;

use crate::catalogue::{CategoryRef, Product, ProductAttributes};
use crate::types::{ProductId, ProductStatus};

/// An active, in-stock product priced at `cents / 100`.
#[must_use]
pub fn product(id: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        brand_id: None,
        category_id: CategoryRef::Id("c-1".to_string()),
        subcategory_id: None,
        title: format!("Product {id}"),
        slug: id.to_string(),
        description: String::new(),
        images: Vec::new(),
        price: Decimal::new(cents, 2),
        compare_at_price: None,
        price_including_tax: None,
        tax_amount: None,
        gst_rate: None,
        stock: 10,
        status: ProductStatus::Active,
        tags: Vec::new(),
        attributes: ProductAttributes::default(),
        rating: None,
        num_reviews: None,
        is_featured: false,
        created_at: None,
        updated_at: None,
    }
}
