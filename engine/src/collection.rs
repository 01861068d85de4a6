//! CartCollection - the in-memory cart state.
//!
//! The collection holds line-items in the order they were first added. All
//! mutations are pure transforms on this value; persistence and publishing
//! are left to the caller.

use crate::{
    error::Result, snapshot::CartSnapshot, Error, LineItem, NewLineItem, Price, ProductId, Quantity,
};
use serde::{Deserialize, Serialize};

/// What a mutation did to the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    /// A new item was appended with quantity 1
    Added { id: ProductId },
    /// An existing item's quantity went up
    Incremented { id: ProductId, quantity: Quantity },
    /// An existing item's quantity went down
    Decremented { id: ProductId, quantity: Quantity },
    /// An item with quantity 1 was decremented and removed
    Removed { id: ProductId },
    /// The id was not found; nothing changed
    Unchanged,
}

impl Change {
    /// Whether the collection value changed.
    pub fn is_changed(&self) -> bool {
        !matches!(self, Change::Unchanged)
    }
}

/// Ordered collection of line-items, keyed by product id.
///
/// Serializes as its [`CartSnapshot`]; deserializing validates the cart
/// invariants the same way [`import_state`](Self::import_state) does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CartSnapshot", into = "CartSnapshot")]
pub struct CartCollection {
    items: Vec<LineItem>,
}

impl CartCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a product to the cart.
    ///
    /// If the id is already present its quantity goes up by one and the
    /// stored title, image and price are kept; the incoming ones are
    /// ignored. Otherwise the product is appended with quantity 1.
    pub fn add_to_cart(&mut self, item: NewLineItem) -> Change {
        if let Some(existing) = self.get_mut(&item.id) {
            existing.bump();
            return Change::Incremented {
                id: item.id,
                quantity: existing.quantity,
            };
        }

        let id = item.id.clone();
        self.items.push(item.into_line_item());
        Change::Added { id }
    }

    /// Increase the quantity of an item by one. Unknown ids are ignored.
    pub fn increment(&mut self, id: &str) -> Change {
        match self.get_mut(id) {
            Some(item) => {
                item.bump();
                Change::Incremented {
                    id: item.id.clone(),
                    quantity: item.quantity,
                }
            }
            None => Change::Unchanged,
        }
    }

    /// Decrease the quantity of an item by one.
    ///
    /// An item at quantity 1 is removed instead of being stored at 0.
    /// Unknown ids are ignored.
    pub fn decrement(&mut self, id: &str) -> Change {
        let Some(index) = self.position(id) else {
            return Change::Unchanged;
        };

        if self.items[index].quantity <= 1 {
            let removed = self.items.remove(index);
            return Change::Removed { id: removed.id };
        }

        let item = &mut self.items[index];
        item.quantity -= 1;
        Change::Decremented {
            id: item.id.clone(),
            quantity: item.quantity,
        }
    }

    /// Get an item by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Check if an item with this id is in the cart.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of price times quantity across all items.
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Export the current collection as a snapshot for persistence.
    pub fn export_state(&self) -> CartSnapshot {
        CartSnapshot::from(self)
    }

    /// Replace the collection with the contents of a snapshot.
    ///
    /// The snapshot is validated first; on error the collection is left
    /// untouched.
    pub fn import_state(&mut self, snapshot: CartSnapshot) -> Result<()> {
        snapshot.validate()?;
        self.items = snapshot.into_items();
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CartCollection {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl TryFrom<CartSnapshot> for CartCollection {
    type Error = Error;

    fn try_from(snapshot: CartSnapshot) -> Result<Self> {
        let mut collection = Self::new();
        collection.import_state(snapshot)?;
        Ok(collection)
    }
}
