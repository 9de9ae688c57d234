//! Product filtering and sorting.
//!
//! [`filter_products`] turns a fetched product list plus the shopper's
//! constraints into the list that is displayed. It borrows the source slice
//! and returns references into it; the source is never reordered or
//! modified.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalogue::Product;

/// Inclusive price bounds applied to the effective price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    /// Create a price range. Callers supply `min <= max`.
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Zero to the largest representable amount.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::MAX,
        }
    }

    /// Inclusive containment check.
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Constraints chosen by the shopper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Category ids or slugs; empty means no restriction.
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Subcategory id or slug.
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub in_stock_only: bool,
    /// Rating floor; zero disables the rating filter.
    #[serde(default)]
    pub min_rating: f64,
}

/// Display order of the filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Featured first, then newest.
    #[default]
    Featured,
    /// Most recently created first.
    Newest,
    /// Cheapest effective price first.
    PriceAsc,
    /// Most expensive effective price first.
    PriceDesc,
    /// Highest rated first, unrated last.
    Rating,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Featured => "featured",
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Rating => "rating",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "newest" => Ok(Self::Newest),
            "price-asc" | "price-low" => Ok(Self::PriceAsc),
            "price-desc" | "price-high" => Ok(Self::PriceDesc),
            "rating" => Ok(Self::Rating),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

/// Lowercased search terms; empty when the query is blank.
fn search_terms(query: Option<&str>) -> Vec<String> {
    query
        .map(|q| q.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default()
}

/// Every term must appear in at least one searchable field.
fn matches_search(product: &Product, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }

    let mut haystacks = Vec::with_capacity(product.tags.len() + 3);
    haystacks.push(product.title.to_lowercase());
    haystacks.push(product.description.to_lowercase());
    haystacks.extend(product.tags.iter().map(|tag| tag.to_lowercase()));
    if let Some(name) = product.category_id.name() {
        haystacks.push(name.to_lowercase());
    }

    terms
        .iter()
        .all(|term| haystacks.iter().any(|field| field.contains(term.as_str())))
}

fn matches_filters(product: &Product, filters: &FilterState) -> bool {
    if !filters.categories.is_empty()
        && !filters
            .categories
            .iter()
            .any(|key| product.category_id.matches(key))
    {
        return false;
    }

    if let Some(subcategory) = &filters.subcategory
        && !product
            .subcategory_id
            .as_ref()
            .is_some_and(|sub| sub.matches(subcategory))
    {
        return false;
    }

    if !filters.price_range.contains(product.effective_price()) {
        return false;
    }

    if filters.in_stock_only && !product.in_stock() {
        return false;
    }

    if filters.min_rating > 0.0 && !product.rating.is_some_and(|r| r >= filters.min_rating) {
        return false;
    }

    true
}

fn compare(a: &Product, b: &Product, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Featured => b
            .is_featured
            .cmp(&a.is_featured)
            .then_with(|| b.created_at.cmp(&a.created_at)),
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::PriceAsc => a.effective_price().cmp(&b.effective_price()),
        SortKey::PriceDesc => b.effective_price().cmp(&a.effective_price()),
        SortKey::Rating => {
            let ra = a.rating.unwrap_or(f64::NEG_INFINITY);
            let rb = b.rating.unwrap_or(f64::NEG_INFINITY);
            rb.total_cmp(&ra)
        }
    }
}

/// Produce the displayed product list.
///
/// Archived products are always dropped. The search query is split on
/// whitespace and matched case-insensitively against title, description,
/// tags and category name. The sort is stable, so products that compare
/// equal keep their source order.
#[must_use]
pub fn filter_products<'a>(
    products: &'a [Product],
    filters: &FilterState,
    search: Option<&str>,
    sort: SortKey,
) -> Vec<&'a Product> {
    let terms = search_terms(search);

    let mut visible: Vec<&Product> = products
        .iter()
        .filter(|p| !p.is_archived())
        .filter(|p| matches_search(p, &terms))
        .filter(|p| matches_filters(p, filters))
        .collect();

    visible.sort_by(|a, b| compare(a, b, sort));
    visible
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::catalogue::{CategoryRef, CategorySummary};
    use crate::fixtures;
    use crate::types::ProductStatus;

    /// A product in the "running" category and "s-tops" subcategory.
    fn product(id: &str, cents: i64) -> Product {
        let mut p = fixtures::product(id, cents);
        p.category_id = CategoryRef::Expanded(CategorySummary {
            id: "c-run".to_string(),
            name: "Running".to_string(),
            slug: "running".to_string(),
        });
        p.subcategory_id = Some(CategoryRef::Id("s-tops".to_string()));
        p
    }

    fn ids(list: &[&Product]) -> Vec<String> {
        list.iter().map(|p| p.id.to_string()).collect()
    }

    /// Ten products, the first three archived.
    fn catalogue() -> Vec<Product> {
        (0..10_i64)
            .map(|i| {
                let mut p = product(&format!("p{i}"), 1000 * (i + 1));
                if i < 3 {
                    p.status = ProductStatus::Archived;
                }
                p
            })
            .collect()
    }

    #[test]
    fn test_defaults_drop_only_archived() {
        let products = catalogue();
        let visible = filter_products(&products, &FilterState::default(), None, SortKey::Featured);
        assert_eq!(visible.len(), 7);
        assert!(visible.iter().all(|p| !p.is_archived()));
    }

    #[test]
    fn test_draft_products_are_not_dropped() {
        let mut draft = product("draft", 1000);
        draft.status = ProductStatus::Draft;
        let products = vec![draft];
        let visible = filter_products(&products, &FilterState::default(), None, SortKey::Featured);
        assert_eq!(ids(&visible), vec!["draft"]);
    }

    #[test]
    fn test_is_pure() {
        let products = catalogue();
        let before = products.clone();
        let filters = FilterState {
            in_stock_only: true,
            ..FilterState::default()
        };
        let first = filter_products(&products, &filters, Some("product"), SortKey::PriceDesc);
        let second = filter_products(&products, &filters, Some("product"), SortKey::PriceDesc);
        assert_eq!(first, second);
        assert_eq!(products, before);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let products = catalogue();
        let visible = filter_products(
            &products,
            &FilterState::default(),
            Some("no-such-thing"),
            SortKey::Featured,
        );
        assert!(visible.is_empty());
    }

    #[test]
    fn test_search_requires_every_term_in_some_field() {
        let mut shorts = product("shorts", 3000);
        shorts.title = "Trail Shorts".to_string();
        shorts.tags = vec!["Lightweight".to_string()];
        let mut tee = product("tee", 2000);
        tee.title = "Trail Tee".to_string();
        tee.description = "Soft cotton".to_string();
        let products = vec![shorts, tee];

        let both = filter_products(
            &products,
            &FilterState::default(),
            Some("  TRAIL  "),
            SortKey::PriceAsc,
        );
        assert_eq!(ids(&both), vec!["tee", "shorts"]);

        let tagged = filter_products(
            &products,
            &FilterState::default(),
            Some("trail lightweight"),
            SortKey::Featured,
        );
        assert_eq!(ids(&tagged), vec!["shorts"]);

        let category = filter_products(
            &products,
            &FilterState::default(),
            Some("running cotton"),
            SortKey::Featured,
        );
        assert_eq!(ids(&category), vec!["tee"]);
    }

    #[test]
    fn test_category_filter_matches_id_or_slug() {
        let mut yoga = product("yoga", 1000);
        yoga.category_id = CategoryRef::Id("c-yoga".to_string());
        let run = product("run", 1000);
        let products = vec![yoga, run];

        let by_slug = FilterState {
            categories: BTreeSet::from(["running".to_string()]),
            ..FilterState::default()
        };
        assert_eq!(
            ids(&filter_products(&products, &by_slug, None, SortKey::Featured)),
            vec!["run"]
        );

        let by_id = FilterState {
            categories: BTreeSet::from(["c-yoga".to_string(), "c-none".to_string()]),
            ..FilterState::default()
        };
        assert_eq!(
            ids(&filter_products(&products, &by_id, None, SortKey::Featured)),
            vec!["yoga"]
        );
    }

    #[test]
    fn test_subcategory_filter_is_exact() {
        let mut bottoms = product("bottoms", 1000);
        bottoms.subcategory_id = Some(CategoryRef::Id("s-bottoms".to_string()));
        let mut loose = product("loose", 1000);
        loose.subcategory_id = None;
        let products = vec![bottoms, loose, product("tops", 1000)];

        let filters = FilterState {
            subcategory: Some("s-tops".to_string()),
            ..FilterState::default()
        };
        assert_eq!(
            ids(&filter_products(&products, &filters, None, SortKey::Featured)),
            vec!["tops"]
        );
    }

    #[test]
    fn test_price_range_uses_effective_price_inclusively() {
        let mut discounted = product("discounted", 9000);
        discounted.compare_at_price = Some(Decimal::new(4000, 2));
        let products = vec![discounted, product("edge", 5000), product("over", 5001)];

        let filters = FilterState {
            price_range: PriceRange::new(Decimal::new(4000, 2), Decimal::new(5000, 2)),
            ..FilterState::default()
        };
        let visible = filter_products(&products, &filters, None, SortKey::PriceAsc);
        assert_eq!(ids(&visible), vec!["discounted", "edge"]);
        assert!(
            visible
                .iter()
                .all(|p| filters.price_range.contains(p.effective_price()))
        );
    }

    #[test]
    fn test_in_stock_only() {
        let mut sold_out = product("sold-out", 1000);
        sold_out.stock = 0;
        let mut negative = product("negative", 1000);
        negative.stock = -2;
        let products = vec![sold_out, negative, product("ok", 1000)];

        let filters = FilterState {
            in_stock_only: true,
            ..FilterState::default()
        };
        let visible = filter_products(&products, &filters, None, SortKey::Featured);
        assert_eq!(ids(&visible), vec!["ok"]);
        assert!(visible.iter().all(|p| p.stock > 0));
    }

    #[test]
    fn test_min_rating_excludes_unrated() {
        let mut good = product("good", 1000);
        good.rating = Some(4.5);
        let mut poor = product("poor", 1000);
        poor.rating = Some(2.0);
        let products = vec![good, poor, product("unrated", 1000)];

        let filters = FilterState {
            min_rating: 4.0,
            ..FilterState::default()
        };
        assert_eq!(
            ids(&filter_products(&products, &filters, None, SortKey::Featured)),
            vec!["good"]
        );

        let inactive = filter_products(&products, &FilterState::default(), None, SortKey::Featured);
        assert_eq!(inactive.len(), 3);
    }

    #[test]
    fn test_sort_featured_then_newest() {
        let day = |d: u32| Utc.with_ymd_and_hms(2025, 9, d, 0, 0, 0).unwrap();
        let mut old_featured = product("old-featured", 1000);
        old_featured.is_featured = true;
        old_featured.created_at = Some(day(1));
        let mut new_featured = product("new-featured", 1000);
        new_featured.is_featured = true;
        new_featured.created_at = Some(day(5));
        let mut newest_plain = product("newest-plain", 1000);
        newest_plain.created_at = Some(day(9));
        let undated = product("undated", 1000);
        let products = vec![undated, old_featured, newest_plain, new_featured];

        let featured = filter_products(&products, &FilterState::default(), None, SortKey::Featured);
        assert_eq!(
            ids(&featured),
            vec!["new-featured", "old-featured", "newest-plain", "undated"]
        );

        let newest = filter_products(&products, &FilterState::default(), None, SortKey::Newest);
        assert_eq!(
            ids(&newest),
            vec!["newest-plain", "new-featured", "old-featured", "undated"]
        );
    }

    #[test]
    fn test_sort_by_price_uses_effective_price() {
        let mut discounted = product("discounted", 9000);
        discounted.compare_at_price = Some(Decimal::new(1500, 2));
        let products = vec![product("mid", 3000), discounted, product("cheap", 2000)];

        let asc = filter_products(&products, &FilterState::default(), None, SortKey::PriceAsc);
        assert_eq!(ids(&asc), vec!["discounted", "cheap", "mid"]);

        let desc = filter_products(&products, &FilterState::default(), None, SortKey::PriceDesc);
        assert_eq!(ids(&desc), vec!["mid", "cheap", "discounted"]);
    }

    #[test]
    fn test_sort_by_rating_puts_unrated_last() {
        let mut top = product("top", 1000);
        top.rating = Some(4.9);
        let mut low = product("low", 1000);
        low.rating = Some(3.1);
        let products = vec![product("unrated", 1000), low, top];

        let sorted = filter_products(&products, &FilterState::default(), None, SortKey::Rating);
        assert_eq!(ids(&sorted), vec!["top", "low", "unrated"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("price-low".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert_eq!("price-desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert_eq!(SortKey::Newest.to_string(), "newest");
        assert!("cheapest".parse::<SortKey>().is_err());
    }
}
