//! Cart commands.
//!
//! The cart lives in `<data dir>/fitgear_cart.json` and is restored before
//! every command, so consecutive invocations see the same cart.

use std::io::Write;

use clap::{Args, Subcommand};
use fitgear_core::{CartState, LineKey, OrderSummary, Product, PromoCode};
use fitgear_storefront::{
    AppError, CartStorage, CartStore, CatalogueClient, FileStorage, LoadOutcome, Result,
    StorefrontConfig,
};
use tracing::info;

use super::money;

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart with an order summary
    Show {
        /// Promo code to apply (SAVE10, WELCOME20)
        #[arg(long)]
        promo: Option<String>,
    },
    /// Add a product to the cart
    Add {
        /// Product id
        product_id: String,

        #[command(flatten)]
        variant: VariantArgs,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line from the cart
    Remove {
        /// Product id
        product_id: String,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Set the quantity of a line (zero or less removes it)
    Update {
        /// Product id
        product_id: String,

        #[command(flatten)]
        variant: VariantArgs,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

/// Size and color selecting a cart line.
#[derive(Args, Debug, Default)]
pub struct VariantArgs {
    /// Selected size
    #[arg(long)]
    pub size: Option<String>,

    /// Selected color
    #[arg(long)]
    pub color: Option<String>,
}

/// Run a cart command against the persisted cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be read, the product cannot be
/// fetched, the action is rejected, or output cannot be written.
pub async fn run<W: Write>(
    command: CartCommand,
    config: &StorefrontConfig,
    out: &mut W,
) -> Result<()> {
    let (mut store, outcome) = CartStore::open(FileStorage::new(&config.data_dir))?;
    if outcome == LoadOutcome::DiscardedCorrupt {
        writeln!(out, "Saved cart could not be read and was reset.")?;
    }

    match command {
        CartCommand::Show { promo } => show(&store, promo.as_deref(), out)?,
        CartCommand::Add {
            product_id,
            variant,
            quantity,
        } => {
            let client = CatalogueClient::new(&config.catalogue);
            let product = client.get_product(&product_id).await?;
            add(&mut store, product, &variant, quantity, out)?;
        }
        CartCommand::Remove {
            product_id,
            variant,
        } => remove(&mut store, &product_id, &variant, out)?,
        CartCommand::Update {
            product_id,
            variant,
            quantity,
        } => update(&mut store, &product_id, &variant, quantity, out)?,
        CartCommand::Clear => {
            store.clear()?;
            writeln!(out, "Cart cleared.")?;
        }
    }
    Ok(())
}

/// Print the cart and its order summary.
///
/// # Errors
///
/// Returns an error for an unknown promo code, an overflowing total or a
/// failed write.
pub fn show<S: CartStorage, W: Write>(
    store: &CartStore<S>,
    promo: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let promo = promo.map(str::parse::<PromoCode>).transpose()?;
    let summary = store.summary(promo)?;
    render_cart(store.state(), &summary, out)?;
    Ok(())
}

/// Add a product, defaulting size and color to the product's first option.
///
/// # Errors
///
/// Returns an error if the quantity is rejected or output fails.
pub fn add<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    product: Product,
    variant: &VariantArgs,
    quantity: u32,
    out: &mut W,
) -> Result<()> {
    let size = variant
        .size
        .clone()
        .or_else(|| product.attributes.size.first().cloned())
        .unwrap_or_default();
    let color = variant
        .color
        .clone()
        .or_else(|| product.attributes.color.first().cloned())
        .unwrap_or_default();
    let title = product.title.clone();

    info!(product_id = %product.id, %size, %color, quantity, "Adding to cart");
    let state = store.add(product, size, color, quantity)?;
    writeln!(
        out,
        "Added {quantity} x {title}. Cart: {} items, {}",
        state.item_count(),
        money(state.total())
    )?;
    Ok(())
}

/// Remove the line matching a product and variant.
///
/// # Errors
///
/// Returns an error if no line or several lines match, or output fails.
pub fn remove<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    product_id: &str,
    variant: &VariantArgs,
    out: &mut W,
) -> Result<()> {
    let key = resolve_line(store.state(), product_id, variant)?;
    let state = store.remove(key)?;
    writeln!(out, "Removed. Cart: {} items", state.item_count())?;
    Ok(())
}

/// Set the quantity of the line matching a product and variant.
///
/// # Errors
///
/// Returns an error if no line or several lines match, the quantity is out
/// of range, or output fails.
pub fn update<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    product_id: &str,
    variant: &VariantArgs,
    quantity: i64,
    out: &mut W,
) -> Result<()> {
    let key = resolve_line(store.state(), product_id, variant)?;
    let state = store.update_quantity(key, quantity)?;
    writeln!(out, "Updated. Cart: {} items", state.item_count())?;
    Ok(())
}

/// Find the one line for `product_id` that agrees with the given size and
/// color. Omitted options match anything.
fn resolve_line(state: &CartState, product_id: &str, variant: &VariantArgs) -> Result<LineKey> {
    let mut candidates = state.items().iter().filter(|line| {
        line.product.id.as_str() == product_id
            && variant
                .size
                .as_deref()
                .is_none_or(|size| line.selected_size == size)
            && variant
                .color
                .as_deref()
                .is_none_or(|color| line.selected_color == color)
    });

    let Some(first) = candidates.next() else {
        return Err(AppError::NotFound(format!(
            "product {product_id} is not in the cart with that size and color"
        )));
    };
    if candidates.next().is_some() {
        return Err(AppError::BadRequest(format!(
            "product {product_id} is in the cart in several variants; pass --size and --color"
        )));
    }
    Ok(first.key())
}

/// Write the cart lines and the order summary.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn render_cart<W: Write>(
    cart: &CartState,
    summary: &OrderSummary,
    out: &mut W,
) -> std::io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }

    writeln!(out, "Cart ({} items)", cart.item_count())?;
    for line in cart.items() {
        writeln!(
            out,
            "  {} x {} [{} / {}]  {}  ({})",
            line.quantity,
            line.product.title,
            line.selected_size,
            line.selected_color,
            line.line_total().map_or_else(|| "-".to_string(), money),
            line.product.id
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Subtotal: {}", money(summary.subtotal))?;
    if let Some(code) = summary.promo {
        writeln!(out, "Discount ({code}): -{}", money(summary.discount))?;
    }
    if summary.shipping.is_zero() {
        writeln!(out, "Shipping: FREE")?;
    } else {
        writeln!(out, "Shipping: {}", money(summary.shipping))?;
    }
    writeln!(out, "Tax: {}", money(summary.tax))?;
    writeln!(out, "Total: {}", money(summary.total))?;
    if let Some(remaining) = summary.free_shipping_remaining {
        writeln!(out, "Add {} more for free shipping!", money(remaining))?;
    }
    Ok(())
}
