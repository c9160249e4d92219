//! Cart commands.
//!
//! # Environment Variables
//!
//! See [`rocket_shoes_cart::config`] for the full list; the ones that matter
//! most here are `ROCKETSHOES_API_URL` and `ROCKETSHOES_STORAGE_PATH`.

use rocket_shoes_cart::{
    CartConfig, CartError, CartStore, CatalogError, ConfigError, FileSlot, HttpCatalog, ProductId,
    TracingNotifier, UpdateProductAmount,
};
use thiserror::Error;
use tracing::info;

/// Store wired the way the CLI runs it.
pub type CliStore = CartStore<HttpCatalog, FileSlot, TracingNotifier>;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog client could not be built.
    #[error("Catalog client error: {0}")]
    Catalog(#[from] CatalogError),

    /// The cart operation failed; the notice has already been logged.
    #[error("{0}")]
    Cart(#[from] CartError),
}

/// Build a store from environment configuration.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the HTTP client fails to
/// build.
pub fn open_store() -> Result<CliStore, CommandError> {
    let config = CartConfig::from_env()?;
    info!(
        api = %config.catalog.base_url,
        storage = %config.storage_path.display(),
        "Opening cart"
    );

    let catalog = HttpCatalog::new(&config.catalog)?;
    let slot = FileSlot::new(&config.storage_path);
    Ok(CartStore::new(config.store, catalog, slot, TracingNotifier))
}

/// Log every line of the cart and its total.
pub fn show(store: &CliStore) {
    let cart = store.cart();
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }

    for product in &cart {
        info!(
            "#{:<4} {:<40} {:>3} x {} = {}",
            product.id,
            product.title().unwrap_or_default(),
            product.amount,
            product.price().map_or_else(|| "-".to_string(), |price| price.to_string()),
            product.subtotal()
        );
    }
    info!(
        "{} product(s), {} unit(s), total {}",
        cart.len(),
        cart.total_units(),
        cart.total()
    );
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns the cart error if the product could not be added.
pub async fn add(store: &CliStore, product_id: ProductId) -> Result<(), CommandError> {
    store.add_product(product_id).await?;
    show(store);
    Ok(())
}

/// Remove a product.
///
/// # Errors
///
/// Returns the cart error if the product is not in the cart.
pub fn remove(store: &CliStore, product_id: ProductId) -> Result<(), CommandError> {
    store.remove_product(product_id)?;
    show(store);
    Ok(())
}

/// Set the amount of a product.
///
/// # Errors
///
/// Returns the cart error if stock is insufficient or the lookup fails.
pub async fn update(store: &CliStore, product_id: ProductId, amount: i64) -> Result<(), CommandError> {
    store
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await?;
    show(store);
    Ok(())
}
