//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FITGEAR_API_BASE_URL` - Catalogue API base URL (default: <https://hoe-be.onrender.com/api>)
//! - `FITGEAR_BRAND` - Brand slug used in catalogue paths (default: sportswear)
//! - `FITGEAR_API_TOKEN` - Bearer token for the catalogue's admin endpoints
//! - `FITGEAR_DATA_DIR` - Directory holding the persisted cart (default: .fitgear)
//! - `FITGEAR_PAGE_SIZE` - Products requested per page, 1-100 (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://hoe-be.onrender.com/api";
const DEFAULT_BRAND: &str = "sportswear";
const DEFAULT_DATA_DIR: &str = ".fitgear";
const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalogue API configuration
    pub catalogue: CatalogueConfig,
    /// Directory the cart snapshot is written to
    pub data_dir: PathBuf,
    /// Page size used when walking product listings
    pub page_size: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalogue API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CatalogueConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: Url,
    /// Brand slug (e.g., sportswear)
    pub brand: String,
    /// Bearer token for admin endpoints
    pub api_token: Option<SecretString>,
}

impl std::fmt::Debug for CatalogueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogueConfig")
            .field("base_url", &self.base_url.as_str())
            .field("brand", &self.brand)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CatalogueConfig {
    /// Configuration pointing at `base_url` with no token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str, brand: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("FITGEAR_API_BASE_URL", base_url)?,
            brand: brand.into(),
            api_token: None,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the API token fails
    /// validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let base_url = parse_base_url(
            "FITGEAR_API_BASE_URL",
            &env.or_default("FITGEAR_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let brand = env.or_default("FITGEAR_BRAND", DEFAULT_BRAND);
        if brand.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "FITGEAR_BRAND".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let api_token = env
            .optional("FITGEAR_API_TOKEN")
            .map(|token| validated_secret("FITGEAR_API_TOKEN", token))
            .transpose()?;

        let data_dir = PathBuf::from(env.or_default("FITGEAR_DATA_DIR", DEFAULT_DATA_DIR));
        let page_size = env
            .or_default("FITGEAR_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar("FITGEAR_PAGE_SIZE".to_string(), e.to_string()))?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidEnvVar(
                "FITGEAR_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE} (got {page_size})"),
            ));
        }

        Ok(Self {
            catalogue: CatalogueConfig {
                base_url,
                brand,
                api_token,
            },
            data_dir,
            page_size,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional, non-empty variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse a base URL, normalised to end with a slash.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

fn validated_secret(var_name: &str, value: String) -> Result<SecretString, ConfigError> {
    validate_secret_strength(&value, var_name)?;
    Ok(SecretString::from(value))
}

/// Expose a configured token for use in an `Authorization` header.
pub(crate) fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}
