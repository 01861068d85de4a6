//! Snapshot types for persisting and restoring cart state.
//!
//! A snapshot is the bridge between the in-memory [`CartCollection`] and
//! durable storage. Its JSON form is a plain array of line-items in cart
//! order, so the value stored on device reads as
//! `[{"id", "title", "imageUrl", "price", "quantity"}, ...]`.

use crate::{error::Result, CartCollection, Error, LineItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A point-in-time copy of the cart contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: Vec<LineItem>,
}

impl CartSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub(crate) fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Number of items in the snapshot.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the snapshot holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the cart invariants: unique ids and quantities of at least 1.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());

        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(Error::DuplicateItem(item.id.clone()));
            }
            if item.quantity == 0 {
                return Err(Error::InvalidQuantity {
                    id: item.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// Only the shape is checked here; call [`validate`](Self::validate) or
    /// [`CartCollection::import_state`] to enforce the cart invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }
}

impl From<&CartCollection> for CartSnapshot {
    fn from(collection: &CartCollection) -> Self {
        Self {
            items: collection.items().to_vec(),
        }
    }
}

impl From<CartCollection> for CartSnapshot {
    fn from(collection: CartCollection) -> Self {
        Self {
            items: collection.items().to_vec(),
        }
    }
}

impl From<Vec<LineItem>> for CartSnapshot {
    fn from(items: Vec<LineItem>) -> Self {
        Self { items }
    }
}
