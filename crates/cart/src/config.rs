//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `ROCKETSHOES_API_URL` - Catalog base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_CART_KEY` - Storage key for the cart (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_STORAGE_PATH` - File backing the storage slot (default: `rocketshoes-storage.json`)
//! - `ROCKETSHOES_HTTP_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product cache lifetime (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Storage key the cart has always been persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_PATH: &str = "rocketshoes-storage.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable is set to a value that cannot be used.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Complete cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Store configuration
    pub store: StoreConfig,
    /// File backing the persistence slot
    pub storage_path: PathBuf,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL serving `/products/{id}` and `/stock/{id}`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long a fetched product stays cached
    pub product_cache_ttl: Duration,
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key the serialized cart is stored under
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Catalog configuration for `base_url` with default timeouts.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            product_cache_ttl: Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_url(
            "ROCKETSHOES_API_URL",
            &lookup("ROCKETSHOES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let timeout = parse_secs(
            "ROCKETSHOES_HTTP_TIMEOUT_SECS",
            lookup("ROCKETSHOES_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let product_cache_ttl = parse_secs(
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            lookup("ROCKETSHOES_PRODUCT_CACHE_TTL_SECS"),
            DEFAULT_PRODUCT_CACHE_TTL_SECS,
        )?;

        let storage_key = lookup("ROCKETSHOES_CART_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let storage_path = PathBuf::from(
            lookup("ROCKETSHOES_STORAGE_PATH").unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string()),
        );

        Ok(Self {
            catalog: CatalogConfig {
                base_url,
                timeout,
                product_cache_ttl,
            },
            store: StoreConfig { storage_key },
            storage_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a whole number of seconds, falling back to `default` when unset.
fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    value.map_or(Ok(Duration::from_secs(default)), |v| {
        v.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
