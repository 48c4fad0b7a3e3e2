//! Cart store.
//!
//! An ordered list of line items mirrored to visitor-scoped storage under a
//! single key. Each request builds its own [`CartStore`] over the request's
//! session; the store is the only writer of that key.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --hydrate()--> Hydrated --add/remove--> (snapshot written)
//!                                       --clear-------> (snapshot deleted)
//! ```
//!
//! Storage is read at most once per store. Every mutation writes the whole
//! list, so concurrent writers resolve last-write-wins. Storage failures and
//! unreadable snapshots are logged and never surfaced: the cart degrades to
//! what is in memory. If the read itself fails, the stored snapshot is left
//! alone until [`CartStore::clear`], since the in-memory list cannot include
//! what it holds.

use tracing::{debug, error, instrument, warn};
use yarn_core::{CartItem, CartItemId, CurrencyCode, Price};

use super::storage::KeyValueStorage;
use crate::models::session::keys;

/// Hydration state of a [`CartStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    /// Storage has not been read yet; the item list is empty.
    Uninitialized,
    /// Storage has been read once.
    Hydrated,
}

/// The visitor's cart.
pub struct CartStore<S> {
    storage: S,
    items: Vec<CartItem>,
    state: CartState,
    /// Set when hydration could not read storage.
    read_failed: bool,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Create an empty, unhydrated store.
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            items: Vec::new(),
            state: CartState::Uninitialized,
            read_failed: false,
        }
    }

    /// Create a store and hydrate it.
    pub async fn load(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.hydrate().await;
        store
    }

    /// Current hydration state.
    pub const fn state(&self) -> CartState {
        self.state
    }

    /// The current items in insertion order. Empty until hydrated.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the store, returning its items.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total garments across all lines, saturating at `u32::MAX`.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, i| count.saturating_add(i.product.quantity))
    }

    /// Sum of priced lines in `currency`. Unpriced lines and lines in other
    /// currencies are left out. `None` if the sum overflows.
    pub fn subtotal(&self, currency: CurrencyCode) -> Option<Price> {
        self.items
            .iter()
            .filter_map(|i| i.unit_price.map(|unit| (unit, i.product.quantity)))
            .filter(|(unit, _)| unit.currency_code == currency)
            .try_fold(Price::zero(currency), |total, (unit, quantity)| {
                total.checked_add(unit.checked_times(quantity)?)
            })
    }

    /// Load the snapshot from storage. Does nothing after the first call.
    ///
    /// A missing, unreadable or malformed snapshot leaves the cart empty.
    #[instrument(skip(self))]
    pub async fn hydrate(&mut self) {
        if self.state == CartState::Hydrated {
            return;
        }
        self.state = CartState::Hydrated;

        let raw = match self.storage.get(keys::CART).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                error!(error = %e, "Failed to read cart snapshot, starting empty");
                self.read_failed = true;
                return;
            }
        };

        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => {
                debug!(lines = items.len(), "Cart hydrated");
                self.items = items;
            }
            Err(e) => {
                error!(error = %e, "Malformed cart snapshot, starting empty");
            }
        }
    }

    /// Append an item. The caller owns id uniqueness; no de-duplication.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn add_item(&mut self, item: CartItem) {
        self.hydrate().await;
        self.items.push(item);
        self.persist().await;
    }

    /// Remove the first item with `id`. Returns whether an item was removed;
    /// an absent id is a no-op.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn remove_item(&mut self, id: &CartItemId) -> bool {
        self.hydrate().await;
        let removed = match self.items.iter().position(|i| &i.id == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        };
        self.persist().await;
        removed
    }

    /// Empty the cart and delete the snapshot.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) {
        self.state = CartState::Hydrated;
        self.read_failed = false;
        self.items.clear();
        if let Err(e) = self.storage.delete(keys::CART).await {
            error!(error = %e, "Failed to delete cart snapshot");
        }
    }

    /// Write the full item list.
    async fn persist(&self) {
        if self.read_failed {
            warn!("Cart snapshot was unreadable, keeping changes in memory");
            return;
        }

        let snapshot = match serde_json::to_string(&self.items) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.set(keys::CART, snapshot).await {
            error!(error = %e, "Failed to write cart snapshot");
        }
    }
}
