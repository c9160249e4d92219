//! Rocket Shoes cart library.
//!
//! A client-side cart state container: it owns the shopper's cart, mirrors
//! every change into a persistence slot, and validates quantity changes
//! against the remote stock service.
//!
//! # Architecture
//!
//! Leaves first:
//! - [`persistence`] - key-value slot the cart is serialized into
//! - [`catalog`] - product and stock lookups
//! - [`notifier`] - fire-and-forget user-facing failure notices
//! - [`store`] - [`CartStore`], composing the above into add/remove/update
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_shoes_cart::{CartConfig, CartStore, FileSlot, HttpCatalog, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::new(
//!     config.store.clone(),
//!     HttpCatalog::new(&config.catalog)?,
//!     FileSlot::new(&config.storage_path),
//!     TracingNotifier,
//! );
//!
//! store.add_product(ProductId::new(1)).await?;
//! println!("{} products in cart", store.cart().len());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notifier;
pub mod persistence;
pub mod store;

pub use catalog::{CatalogClient, CatalogError, HttpCatalog};
pub use config::{CartConfig, CatalogConfig, ConfigError, DEFAULT_STORAGE_KEY, StoreConfig};
pub use error::{CartError, FailureKind};
pub use notifier::{Notice, Notifier, QueueNotifier, TracingNotifier};
pub use persistence::{FileSlot, MemorySlot, PersistenceSlot, StorageError};
pub use store::{CartStore, UpdateProductAmount};

pub use rocket_shoes_core::{Cart, Price, Product, ProductId, Stock};
