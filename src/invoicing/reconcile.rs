//! Stock adjustment planning
//!
//! Given the committed state of an invoice line before and after a mutation,
//! [`plan`] lists the stock changes that keep each item's available quantity
//! equal to its initial stock minus everything invoiced against it.
//!
//! | original | updated | deltas                                  |
//! |----------|---------|-----------------------------------------|
//! | none     | A × q   | A −q                                    |
//! | A × q0   | A × q1  | A −(q1 − q0), nothing when q1 == q0     |
//! | A × q0   | B × q1  | A +q0, B −q1                            |
//! | A × q0   | none    | A +q0                                   |

use crate::core::DataService;
use crate::core::error::AdminResult;
use crate::entities::{Item, ItemPatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The item and quantity an invoice holds against stock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLine {
    pub item_id: Uuid,
    pub quantity: f64,
}

impl StockLine {
    pub fn new(item_id: Uuid, quantity: f64) -> Self {
        Self { item_id, quantity }
    }
}

/// A signed change to one item's stock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDelta {
    pub item_id: Uuid,
    pub delta: f64,
}

impl StockDelta {
    pub fn new(item_id: Uuid, delta: f64) -> Self {
        Self { item_id, delta }
    }

    /// The delta that undoes this one
    pub fn inverse(&self) -> Self {
        Self::new(self.item_id, -self.delta)
    }

    /// Stock after applying this delta
    pub fn apply(&self, stock: f64) -> f64 {
        stock + self.delta
    }
}

/// Plan the stock changes for a transition from `original` to `updated`
pub fn plan(original: Option<StockLine>, updated: Option<StockLine>) -> Vec<StockDelta> {
    let deltas = match (original, updated) {
        (None, None) => Vec::new(),
        (None, Some(new)) => vec![StockDelta::new(new.item_id, -new.quantity)],
        (Some(old), None) => vec![StockDelta::new(old.item_id, old.quantity)],
        (Some(old), Some(new)) if old.item_id == new.item_id => {
            vec![StockDelta::new(new.item_id, old.quantity - new.quantity)]
        }
        (Some(old), Some(new)) => vec![
            StockDelta::new(old.item_id, old.quantity),
            StockDelta::new(new.item_id, -new.quantity),
        ],
    };

    deltas.into_iter().filter(|d| d.delta != 0.0).collect()
}

/// Highest quantity the form may request for `selected_item`
///
/// Editing an invoice that already holds stock of the same item frees that
/// quantity again, so it is added back to the live stock.
pub fn availability_ceiling(
    current_stock: f64,
    selected_item: Uuid,
    original: Option<StockLine>,
) -> f64 {
    match original {
        Some(line) if line.item_id == selected_item => current_stock + line.quantity,
        _ => current_stock,
    }
}

/// Apply one delta to the live stock of its item
///
/// Reads the current stock and writes `stock + delta` back. The read and the
/// write are separate calls, so a concurrent writer in between is lost.
pub async fn apply_stock_delta(
    items: &dyn DataService<Item>,
    delta: StockDelta,
) -> AdminResult<Item> {
    let item = items.get(&delta.item_id).await?;
    let stock = delta.apply(item.quantity);
    tracing::debug!(
        item_id = %delta.item_id,
        delta = delta.delta,
        from = item.quantity,
        to = stock,
        "adjusting item stock"
    );
    items.patch(&delta.item_id, ItemPatch::stock(stock)).await
}
