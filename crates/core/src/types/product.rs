//! Catalog products and stock snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;
use super::price::Price;

/// A product as returned by the catalog and as held in the cart.
///
/// Only `id` and `amount` drive cart logic. Everything else the catalog sent
/// (title, price, image and any other display data) is kept verbatim in
/// [`Product::fields`], so a persisted cart writes back exactly what the
/// catalog returned and a missing or odd display field never rejects a
/// product. The catalog body carries no `amount`, so it reads as `0`; the
/// cart sets it when the product is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier, unique within a cart.
    pub id: ProductId,
    /// Units of this product currently in the cart.
    #[serde(default)]
    pub amount: u32,
    /// Display fields, opaque to the cart.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Product {
    /// Create a product with the usual display fields and `amount` of zero.
    pub fn new(id: ProductId, title: impl Into<String>, price: Price, image: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.into()));
        fields.insert("price".to_string(), serde_json::to_value(price).unwrap_or_default());
        fields.insert("image".to_string(), Value::String(image.into()));
        Self {
            id,
            amount: 0,
            fields,
        }
    }

    /// Returns the same product holding `amount` units.
    #[must_use]
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Display title, if the catalog sent a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    /// Image URL, if the catalog sent a string.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.fields.get("image").and_then(Value::as_str)
    }

    /// Unit price, if the catalog sent a non-negative number.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.fields
            .get("price")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .filter(|price| *price >= Price::ZERO)
    }

    /// Unit price multiplied by the amount held. A product without a usable
    /// price contributes nothing.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price().unwrap_or(Price::ZERO).times(self.amount)
    }
}

/// Units of a product available from the catalog.
///
/// A read-only snapshot; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product this stock level belongs to.
    pub id: ProductId,
    /// Units available.
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be held given this stock level.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}
