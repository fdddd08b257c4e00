//! Item document: a stock-keeping unit with a unit price

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An inventory item
///
/// `quantity` is the stock still available to invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: Uuid,

    #[validate(length(min = 1))]
    pub details: String,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn new(details: impl Into<String>, quantity: f64, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            details: details.into(),
            quantity,
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub details: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

impl ItemPatch {
    /// A patch that only sets the stock count
    pub fn stock(quantity: f64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }
}

crate::impl_document!(Item, "item", "items", ItemPatch);

crate::impl_patch!(ItemPatch => Item { details, quantity, price });
