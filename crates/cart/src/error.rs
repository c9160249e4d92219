//! Cart operation errors.
//!
//! Store operations return `Result<(), CartError>` so callers can match on
//! the failure category. The store has already notified the shopper by the
//! time an `Err` is returned; callers never need to notify again.

use rocket_shoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::persistence::StorageError;

/// Why a cart operation left the cart unchanged.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The requested amount exceeds available stock.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Looking up the product or its stock failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The new cart could not be persisted.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse failure category of a [`CartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The id is missing from the catalog, its stock, or the cart.
    NotFound,
    /// The requested amount exceeds stock.
    StockExceeded,
    /// A catalog call failed in transit or returned garbage.
    Transport,
    /// The persistence slot rejected the write.
    Storage,
}

impl CartError {
    /// Category of this failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotInCart(_) | Self::Catalog(CatalogError::NotFound(_)) => FailureKind::NotFound,
            Self::OutOfStock { .. } => FailureKind::StockExceeded,
            Self::Catalog(_) => FailureKind::Transport,
            Self::Storage(_) => FailureKind::Storage,
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
