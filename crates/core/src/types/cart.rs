//! Cart line items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::CartItemId;
use super::price::Price;

/// What was configured in the order wizard for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Sector slug (e.g. `healthcare`, `hospitality`).
    pub sector: String,
    /// Garment type slug (e.g. `scrubs`, `chef-jacket`).
    pub garment_type: String,
    /// Size label as shown to the customer.
    pub size: String,
    /// Number of garments on this line.
    pub quantity: u32,
}

/// A line item in the order-in-progress.
///
/// Items are never edited in place: a changed line is removed and a new
/// one added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: ProductDescriptor,
    /// Unit price, when known. Custom configurations are quoted later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Price>,
    /// Display-only data (colour names, logo placement, localized titles).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl CartItem {
    /// Create a line item without price or metadata.
    #[must_use]
    pub fn new(id: impl Into<CartItemId>, product: ProductDescriptor) -> Self {
        Self {
            id: id.into(),
            product,
            unit_price: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Set the unit price.
    #[must_use]
    pub fn with_unit_price(mut self, price: Price) -> Self {
        self.unit_price = Some(price);
        self
    }

    /// Add a display metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Unit price multiplied by quantity. `None` if the line is unpriced or
    /// the product overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.unit_price?.checked_times(self.product.quantity)
    }
}
