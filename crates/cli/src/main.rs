//! FitGear CLI - cart and catalogue from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalogue
//! fitgear products list --category running --in-stock --sort price-asc
//! fitgear products list --search "trail tee" --min-rating 4
//! fitgear products show 68b6e1
//! fitgear categories
//! fitgear categories --subcategories-of running
//!
//! # Manage the persisted cart
//! fitgear cart add 68b6e1 --size M --color Black --quantity 2
//! fitgear cart update 68b6e1 --size M --color Black 3
//! fitgear cart remove 68b6e1
//! fitgear cart show --promo SAVE10
//! fitgear cart clear
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and change the cart stored under the data directory
//! - `products` - List, filter, sort and inspect catalogue products
//! - `categories` - List categories or a category's subcategories

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fitgear_storefront::{AppError, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::CartCommand;
use commands::products::ProductsCommand;

#[derive(Parser)]
#[command(name = "fitgear")]
#[command(author, version, about = "FitGear storefront CLI")]
struct Cli {
    /// Directory the cart is stored in (overrides `FITGEAR_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and change the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Browse catalogue products
    Products {
        #[command(subcommand)]
        action: ProductsCommand,
    },
    /// List categories
    Categories {
        /// List the subcategories of this category instead
        #[arg(long, value_name = "SLUG")]
        subcategories_of: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fitgear_storefront=info,fitgear_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            AppError::from(e).report();
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        e.report();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut config: StorefrontConfig) -> fitgear_storefront::Result<()> {
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Cart { action } => commands::cart::run(action, &config, &mut out).await?,
        Commands::Products { action } => {
            commands::products::run(action, &config, &mut out).await?;
        }
        Commands::Categories { subcategories_of } => {
            commands::products::categories(&config, subcategories_of.as_deref(), &mut out)
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_categories() {
        let cli = Cli::try_parse_from(["fitgear", "categories", "--subcategories-of", "running"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Categories { subcategories_of: Some(ref slug) } if slug == "running"
        ));
    }

    #[test]
    fn test_global_data_dir() {
        let cli = Cli::try_parse_from(["fitgear", "cart", "show", "--data-dir", "/tmp/cart"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/cart")));
    }
}
