//! Read-only access to the product catalog and stock levels.
//!
//! # Architecture
//!
//! - The catalog is source of truth for products and stock - the cart never
//!   writes to it
//! - [`HttpCatalog`] talks to the REST API with `reqwest`
//! - Products are cached in-memory via `moka`; stock is always fetched fresh
//!
//! # Endpoints
//!
//! - `GET /products/{id}` - product body
//! - `GET /stock/{id}` - `{ "amount": <units> }`
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_shoes_cart::catalog::{CatalogClient, HttpCatalog};
//!
//! let catalog = HttpCatalog::new(&config.catalog)?;
//! let product = catalog.product(ProductId::new(1)).await?;
//! let stock = catalog.stock(product.id).await?;
//! ```

mod http;

pub use http::HttpCatalog;

use std::future::Future;
use std::sync::Arc;

use rocket_shoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when reading from the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog has no product or stock entry for the id.
    #[error("Not found: {0}")]
    NotFound(ProductId),

    /// The catalog returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body was not what the endpoint promises.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Product and stock lookups the cart validates against.
pub trait CatalogClient: Send + Sync {
    /// Fetch the product with `id`.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Fetch the current stock level for `id`.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;
}

impl<C: CatalogClient> CatalogClient for Arc<C> {
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send {
        (**self).product(id)
    }

    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send {
        (**self).stock(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound(ProductId::new(9));
        assert_eq!(err.to_string(), "Not found: 9");

        let err = CatalogError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - unavailable");
    }
}
