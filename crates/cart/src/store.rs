//! The cart store: the single owner of cart state.
//!
//! [`CartStore`] holds the current [`Cart`] in a `watch` channel so any
//! number of consumers can read snapshots or await changes, while every
//! mutation funnels through one commit path that writes the persistence slot
//! before publishing.
//!
//! # Failure contract
//!
//! Operations never panic. On failure the cart is left untouched, exactly one
//! [`Notice`] is sent to the notifier, and the error is returned so callers
//! can branch on [`CartError::kind`](crate::CartError::kind).
//!
//! # Concurrency
//!
//! Catalog lookups are awaited without holding any lock, so two operations
//! on the same product can interleave; whichever commits last wins. Commits
//! themselves are serialized and always build on the latest cart.

use std::sync::{Mutex, PoisonError};

use rocket_shoes_core::{Cart, ProductId};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::catalog::CatalogClient;
use crate::config::StoreConfig;
use crate::error::{CartError, Result};
use crate::notifier::{Notice, Notifier};
use crate::persistence::{PersistenceSlot, StorageError};

/// Arguments to [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    /// Product whose amount changes.
    pub product_id: ProductId,
    /// Target amount. Zero or negative is ignored.
    pub amount: i64,
}

/// Cart state container backed by a catalog, a persistence slot and a
/// notifier.
pub struct CartStore<C, S, N> {
    catalog: C,
    slot: S,
    notifier: N,
    storage_key: String,
    state: watch::Sender<Cart>,
    commit_lock: Mutex<()>,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: CatalogClient,
    S: PersistenceSlot,
    N: Notifier,
{
    /// Create a store, restoring the cart persisted under
    /// `config.storage_key`.
    ///
    /// A missing, unreadable or corrupt value starts an empty cart.
    pub fn new(config: StoreConfig, catalog: C, slot: S, notifier: N) -> Self {
        let initial = load_cart(&slot, &config.storage_key);
        info!(
            key = %config.storage_key,
            products = initial.len(),
            "Cart restored"
        );

        Self {
            catalog,
            slot,
            notifier,
            storage_key: config.storage_key,
            state: watch::Sender::new(initial),
            commit_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver starts at the current cart and is marked changed on
    /// every commit.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Add one unit of `product_id`.
    ///
    /// A product already in the cart goes through
    /// [`update_product_amount`](Self::update_product_amount) with its amount
    /// plus one, including the stock check and that operation's notices.
    /// Otherwise the product is fetched and appended with an amount of one.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the lookup or the commit fails; the shopper
    /// has been notified with [`Notice::AddFailed`].
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<()> {
        let existing = self.state.borrow().get(product_id).map(|p| p.amount);

        if let Some(amount) = existing {
            debug!(amount, "Product already in cart, incrementing");
            return self
                .update_product_amount(UpdateProductAmount {
                    product_id,
                    amount: i64::from(amount) + 1,
                })
                .await;
        }

        let result: Result<()> = async {
            let product = self.catalog.product(product_id).await?;
            self.commit(|cart| {
                if cart.contains(product_id) {
                    // A concurrent add landed while the lookup was in flight.
                    debug!("Product added concurrently, keeping existing entry");
                    cart.clone()
                } else {
                    cart.with_product(product.with_amount(1))
                }
            })
        }
        .await;

        self.report(result, Notice::AddFailed)
    }

    /// Remove `product_id` from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product is absent, or a
    /// storage error if the commit fails; the shopper has been notified with
    /// [`Notice::RemoveFailed`].
    #[instrument(skip(self))]
    pub fn remove_product(&self, product_id: ProductId) -> Result<()> {
        let present = self.state.borrow().contains(product_id);
        let result = if present {
            self.commit(|cart| cart.without(product_id))
        } else {
            Err(CartError::NotInCart(product_id))
        };

        self.report(result, Notice::RemoveFailed)
    }

    /// Set the amount held of a product, validated against stock.
    ///
    /// An amount of zero or less does nothing and reports success.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] (notified as
    /// [`Notice::OutOfStock`]) if the catalog holds fewer units than
    /// requested, or any other `CartError` (notified as
    /// [`Notice::UpdateFailed`]) if the lookup or commit fails.
    #[instrument(skip(self))]
    pub async fn update_product_amount(&self, update: UpdateProductAmount) -> Result<()> {
        let UpdateProductAmount { product_id, amount } = update;

        if amount <= 0 {
            debug!("Non-positive amount ignored");
            return Ok(());
        }

        let result: Result<()> = async {
            let stock = self.catalog.stock(product_id).await?;
            match u32::try_from(amount) {
                Ok(requested) if stock.covers(requested) => {
                    self.commit(|cart| cart.with_amount(product_id, requested))
                }
                _ => Err(CartError::OutOfStock {
                    product_id,
                    requested: u32::try_from(amount).unwrap_or(u32::MAX),
                    available: stock.amount,
                }),
            }
        }
        .await;

        let notice = match &result {
            Err(CartError::OutOfStock { .. }) => Notice::OutOfStock,
            _ => Notice::UpdateFailed,
        };
        self.report(result, notice)
    }

    /// Build the next cart from the latest one, persist it, then publish it.
    ///
    /// Nothing is published if the write fails, so the slot and the
    /// in-memory cart never disagree.
    fn commit(&self, next: impl FnOnce(&Cart) -> Cart) -> Result<()> {
        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let next = next(&*self.state.borrow());
        let json = serde_json::to_string(&next).map_err(StorageError::from)?;
        self.slot.set(&self.storage_key, &json)?;

        info!(
            products = next.len(),
            units = next.total_units(),
            "Cart committed"
        );
        self.state.send_replace(next);
        Ok(())
    }

    /// Notify the shopper if `result` is a failure, then hand it back.
    fn report(&self, result: Result<()>, notice: Notice) -> Result<()> {
        if let Err(e) = &result {
            warn!(error = %e, kind = ?e.kind(), "Cart operation failed");
            self.notifier.notify(notice);
        }
        result
    }
}

/// Read the persisted cart, falling back to empty on any problem.
fn load_cart<S: PersistenceSlot>(slot: &S, key: &str) -> Cart {
    let json = match slot.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, key, "Failed to read persisted cart, starting empty");
            return Cart::new();
        }
    };

    let stored: Cart = match serde_json::from_str(&json) {
        Ok(cart) => cart,
        Err(e) => {
            warn!(error = %e, key, "Persisted cart is corrupt, starting empty");
            return Cart::new();
        }
    };

    // Keep the first entry per id if the stored value was edited by hand.
    let mut deduped = Cart::new();
    for product in stored.iter() {
        if deduped.contains(product.id) {
            warn!(product_id = %product.id, "Dropping duplicate persisted cart entry");
        } else {
            deduped = deduped.with_product(product.clone());
        }
    }
    deduped
}
