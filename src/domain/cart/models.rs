//! Cart Models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ids::{ProductId, TypedUuid},
    prices::Price,
};

/// Local cart row identifier. Regenerated whenever the cart is restored.
pub type CartItemId = TypedUuid<CartItem>;

/// Chosen customization options, keyed by customization name.
pub type Customizations = BTreeMap<String, String>;

/// Product Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Backend id.
    pub id: ProductId,
    /// Menu name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Menu description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Menu section, e.g. `coffee`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Picture shown on the menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// CartItem Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Local row id.
    pub id: CartItemId,
    /// Product on this line.
    pub product_id: ProductId,
    /// Units, at least 1.
    pub quantity: u32,
    /// Chosen options.
    pub customizations: Customizations,
    /// Free-text notes for the barista.
    pub notes: String,
    /// Product data, missing until re-attached after a restore.
    pub product: Option<Product>,
}

impl CartItem {
    /// Unit price times quantity. Items without product data cost nothing.
    pub fn line_total(&self) -> Price {
        self.product
            .as_ref()
            .and_then(|product| product.price.checked_mul(self.quantity))
            .unwrap_or(Price::ZERO)
    }

    /// Whether `item` describes the same product with the same choices.
    pub fn is_mergeable_with(&self, item: &NewCartItem) -> bool {
        self.product_id == item.product_id && self.customizations == item.customizations
    }
}

/// NewCartItem Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    /// Product to add.
    pub product_id: ProductId,
    /// Units to add.
    pub quantity: u32,
    /// Chosen options.
    pub customizations: Customizations,
    /// Free-text notes for the barista.
    pub notes: String,
    /// Product data, if already known.
    pub product: Option<Product>,
}

impl NewCartItem {
    /// One unit of `product` with no customizations.
    pub fn for_product(product: Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            quantity,
            customizations: Customizations::new(),
            notes: String::new(),
            product: Some(product),
        }
    }
}

/// Persisted form of a cart row, without local id or product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshotItem {
    /// Product on this line.
    pub product_id: ProductId,
    /// Units.
    pub quantity: u32,
    /// Chosen options.
    #[serde(default)]
    pub customizations: Customizations,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

impl From<&CartItem> for CartSnapshotItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            customizations: item.customizations.clone(),
            notes: item.notes.clone(),
        }
    }
}

impl From<CartSnapshotItem> for CartItem {
    fn from(item: CartSnapshotItem) -> Self {
        Self {
            id: CartItemId::generate(),
            product_id: item.product_id,
            quantity: item.quantity.max(1),
            customizations: item.customizations,
            notes: item.notes,
            product: None,
        }
    }
}
