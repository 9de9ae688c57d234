//! Catalogue commands.
//!
//! Product listings fetch the brand's whole catalogue, or one subcategory of
//! it when a single category and a subcategory are named, then narrow and
//! order it locally with the filter pipeline.

use std::collections::BTreeSet;
use std::io::Write;

use clap::{Args, Subcommand};
use fitgear_core::{FilterState, PriceRange, Product, SortKey, filter_products};
use fitgear_storefront::{CatalogueClient, Result, StorefrontConfig};
use rust_decimal::Decimal;

use super::money;

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List products, filtered and sorted
    List(ListArgs),
    /// Show one product
    Show {
        /// Product id
        id: String,
    },
}

/// Filters and ordering for `products list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Free-text search over title, description, tags and category
    #[arg(short, long)]
    pub search: Option<String>,

    /// Category id or slug (repeatable; any match passes)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Subcategory id or slug
    #[arg(long)]
    pub subcategory: Option<String>,

    /// Lowest effective price
    #[arg(long)]
    pub min_price: Option<Decimal>,

    /// Highest effective price
    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Only products with stock
    #[arg(long)]
    pub in_stock: bool,

    /// Minimum rating (0 disables the check)
    #[arg(long, default_value_t = 0.0)]
    pub min_rating: f64,

    /// Ordering: featured, newest, price-asc, price-desc, rating
    #[arg(long, default_value_t = SortKey::Featured)]
    pub sort: SortKey,
}

impl ListArgs {
    /// Filter state described by these arguments.
    #[must_use]
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            categories: self.categories.iter().cloned().collect(),
            subcategory: self.subcategory.clone(),
            price_range: PriceRange::new(
                self.min_price.unwrap_or(Decimal::ZERO),
                self.max_price.unwrap_or(Decimal::MAX),
            ),
            in_stock_only: self.in_stock,
            min_rating: self.min_rating,
        }
    }

    /// Category and subcategory slugs to fetch from the subcategory
    /// endpoint, when exactly one category and a subcategory are given.
    #[must_use]
    pub fn subcategory_scope(&self) -> Option<(&str, &str)> {
        match (self.categories.as_slice(), self.subcategory.as_deref()) {
            ([category], Some(subcategory)) => Some((category.as_str(), subcategory)),
            _ => None,
        }
    }

    /// Filter state for a listing fetched with [`ListArgs::subcategory_scope`].
    ///
    /// The endpoint already restricts category and subcategory, and returns
    /// products that may carry the category as an id rather than a slug.
    #[must_use]
    pub fn scoped_filter_state(&self) -> FilterState {
        FilterState {
            categories: BTreeSet::new(),
            subcategory: None,
            ..self.filter_state()
        }
    }
}

/// Run a products command.
///
/// # Errors
///
/// Returns an error if the catalogue request fails or output cannot be
/// written.
pub async fn run<W: Write>(
    command: ProductsCommand,
    config: &StorefrontConfig,
    out: &mut W,
) -> Result<()> {
    let client = CatalogueClient::new(&config.catalogue);

    match command {
        ProductsCommand::List(args) => {
            let (products, filters) = match args.subcategory_scope() {
                Some((category, subcategory)) => (
                    client
                        .fetch_subcategory_products(category, subcategory, config.page_size)
                        .await?,
                    args.scoped_filter_state(),
                ),
                None => (
                    client.fetch_all_products(config.page_size).await?,
                    args.filter_state(),
                ),
            };
            let visible = filter_products(&products, &filters, args.search.as_deref(), args.sort);
            tracing::debug!(
                fetched = products.len(),
                shown = visible.len(),
                "Filtered catalogue"
            );
            render_products(&visible, out)?;
        }
        ProductsCommand::Show { id } => {
            let product = client.get_product(&id).await?;
            render_product(&product, out)?;
        }
    }
    Ok(())
}

/// List categories, or the subcategories of one category.
///
/// # Errors
///
/// Returns an error if the catalogue request fails or output cannot be
/// written.
pub async fn categories<W: Write>(
    config: &StorefrontConfig,
    subcategories_of: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let client = CatalogueClient::new(&config.catalogue);

    let rows: Vec<(String, String)> = match subcategories_of {
        Some(category) => client
            .list_subcategories(category)
            .await?
            .into_iter()
            .map(|s| (s.slug, s.name))
            .collect(),
        None => client
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.slug, c.name))
            .collect(),
    };

    if rows.is_empty() {
        writeln!(out, "No categories found.")?;
    }
    for (slug, name) in rows {
        writeln!(out, "{slug:<24} {name}")?;
    }
    Ok(())
}

fn price_label(product: &Product) -> String {
    match product.compare_at_price {
        Some(sale) => format!("{} (was {})", money(sale), money(product.price)),
        None => money(product.price),
    }
}

/// Write one line per product.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn render_products<W: Write>(products: &[&Product], out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{} products", products.len())?;
    for product in products {
        let rating = product
            .rating
            .map_or_else(String::new, |rating| format!("  {rating:.1}/5"));
        let stock = if product.in_stock() { "" } else { "  [out of stock]" };
        writeln!(
            out,
            "  {}  {}{rating}{stock}  ({})",
            product.title,
            price_label(product),
            product.id
        )?;
    }
    Ok(())
}

/// Write the details of one product.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn render_product<W: Write>(product: &Product, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{} ({})", product.title, product.id)?;
    writeln!(out, "Price: {}", price_label(product))?;
    if let Some(rating) = product.rating {
        writeln!(
            out,
            "Rating: {rating:.1}/5 ({} reviews)",
            product.num_reviews.unwrap_or(0)
        )?;
    }
    writeln!(out, "Stock: {}", product.stock.max(0))?;
    if !product.attributes.size.is_empty() {
        writeln!(out, "Sizes: {}", product.attributes.size.join(", "))?;
    }
    if !product.attributes.color.is_empty() {
        writeln!(out, "Colors: {}", product.attributes.color.join(", "))?;
    }
    if !product.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.description)?;
    }
    Ok(())
}
