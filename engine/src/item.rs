//! Line-item types stored in a cart.

use crate::{Price, ProductId, Quantity};
use serde::{Deserialize, Deserializer, Serialize};

/// A product as submitted by the caller, before it has a quantity.
///
/// The quantity is assigned by [`CartCollection::add_to_cart`](crate::CartCollection::add_to_cart),
/// never by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    /// Product identifier, unique within a cart
    pub id: ProductId,
    /// Display name
    pub title: String,
    /// Reference to the product image
    #[serde(alias = "image_url")]
    pub image_url: String,
    /// Unit price
    #[serde(deserialize_with = "price_or_nan")]
    pub price: Price,
}

impl NewLineItem {
    /// Create a new candidate item.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    pub(crate) fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product identifier, unique within a cart
    pub id: ProductId,
    /// Display name
    pub title: String,
    /// Reference to the product image
    #[serde(alias = "image_url")]
    pub image_url: String,
    /// Unit price
    #[serde(deserialize_with = "price_or_nan")]
    pub price: Price,
    /// Number of units, at least 1 while the item is in a cart
    pub quantity: Quantity,
}

impl LineItem {
    /// Price of all units of this item.
    pub fn line_total(&self) -> Price {
        self.price * f64::from(self.quantity)
    }

    pub(crate) fn bump(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }
}

/// JSON has no NaN or infinity; serde_json writes them as `null`, so read
/// `null` back as NaN instead of rejecting the whole cart.
fn price_or_nan<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Price>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
