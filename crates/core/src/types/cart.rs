//! The cart value and its pure transitions.
//!
//! A [`Cart`] is never edited in place by its owner. Each transition returns
//! a new value, which lets the store validate and persist the next state
//! before anyone can observe it.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Ordered list of products held by a shopper, in insertion order.
///
/// Serializes as a bare JSON array of products, each with its `amount`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(Vec<Product>);

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Products in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.0
    }

    /// Iterate over the products in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Product> {
        self.0.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cart holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the entry for `id`.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.0.iter().find(|p| p.id == id)
    }

    /// Whether an entry for `id` exists.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Sum of all amounts.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.0.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Sum of all subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.0.iter().map(Product::subtotal).sum()
    }

    /// Returns this cart with `product` appended.
    ///
    /// Callers must check [`Cart::contains`] first; appending an id that is
    /// already present would break the one-entry-per-id invariant.
    #[must_use]
    pub fn with_product(&self, product: Product) -> Self {
        debug_assert!(!self.contains(product.id), "duplicate cart entry {}", product.id);
        let mut items = self.0.clone();
        items.push(product);
        Self(items)
    }

    /// Returns this cart without the entry for `id`.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Self {
        Self(self.0.iter().filter(|p| p.id != id).cloned().collect())
    }

    /// Returns this cart with the entry for `id` holding `amount` units.
    ///
    /// Other entries and their order are unchanged. If `id` is absent the
    /// result equals `self`.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Self {
        Self(
            self.0
                .iter()
                .map(|p| {
                    if p.id == id {
                        p.clone().with_amount(amount)
                    } else {
                        p.clone()
                    }
                })
                .collect(),
        )
    }
}

impl From<Vec<Product>> for Cart {
    fn from(items: Vec<Product>) -> Self {
        Self(items)
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.0
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = core::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
