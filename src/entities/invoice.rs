//! Invoice document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

/// Upper bound on `quantity` and `subTotal`
pub const MAX_QUANTITY: f64 = 10_000_000.0;
pub const MAX_SUB_TOTAL: f64 = 10_000_000.0;
/// Upper bound on `discount` and `total`
pub const MAX_DISCOUNT_FIELD: f64 = 1_000_000.0;
pub const MAX_TOTAL: f64 = 1_000_000.0;

/// An invoice for a quantity of one item, billed to one company
///
/// `sub_total` and `total` are snapshots computed when the invoice was
/// entered; the store never re-derives them. Absent numeric fields read as 0
/// through the accessor methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: Uuid,

    #[serde(default)]
    pub company_id: Option<Uuid>,

    #[serde(default)]
    pub item_id: Option<Uuid>,

    #[serde(default)]
    #[validate(range(max = 10000000.0))]
    pub quantity: Option<f64>,

    #[serde(default)]
    #[validate(range(max = 10000000.0))]
    pub sub_total: Option<f64>,

    /// Discount percentage
    #[serde(default)]
    #[validate(range(max = 1000000.0))]
    pub discount: Option<f64>,

    #[serde(default)]
    #[validate(range(max = 1000000.0))]
    pub total: Option<f64>,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// An empty invoice authored by `author`
    pub fn new(author: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: None,
            item_id: None,
            quantity: None,
            sub_total: None,
            discount: None,
            total: None,
            created_by: author,
            updated_by: author,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }

    pub fn sub_total(&self) -> f64 {
        self.sub_total.unwrap_or(0.0)
    }

    pub fn discount(&self) -> f64 {
        self.discount.unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }
}

/// Partial update for an [`Invoice`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoicePatch {
    pub company_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub quantity: Option<f64>,
    pub sub_total: Option<f64>,
    pub discount: Option<f64>,
    pub total: Option<f64>,
    pub updated_by: Option<Uuid>,
}

crate::impl_document!(Invoice, "invoice", "invoices", InvoicePatch);

crate::impl_patch!(InvoicePatch => Invoice {
    updated_by,
} optional {
    company_id,
    item_id,
    quantity,
    sub_total,
    discount,
    total,
});

/// A resolved reference: the referenced id plus the projected fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_id")]
    pub id: Uuid,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Reference {
    /// A projected string field
    pub fn label(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// An invoice whose company and item references were populated for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedInvoice {
    #[serde(rename = "_id")]
    pub id: Uuid,

    #[serde(default)]
    pub company_id: Option<Reference>,

    #[serde(default)]
    pub item_id: Option<Reference>,

    #[serde(default)]
    pub quantity: Option<f64>,

    #[serde(default)]
    pub sub_total: Option<f64>,

    #[serde(default)]
    pub discount: Option<f64>,

    #[serde(default)]
    pub total: Option<f64>,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PopulatedInvoice {
    /// Wrap an invoice whose references could not be resolved
    pub fn unresolved(invoice: &Invoice) -> Self {
        let bare = |id: Uuid| Reference {
            id,
            fields: Map::new(),
        };
        Self {
            id: invoice.id,
            company_id: invoice.company_id.map(bare),
            item_id: invoice.item_id.map(bare),
            quantity: invoice.quantity,
            sub_total: invoice.sub_total,
            discount: invoice.discount,
            total: invoice.total,
            created_by: invoice.created_by,
            updated_by: invoice.updated_by,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_id.as_ref().and_then(|c| c.label("name"))
    }

    pub fn item_details(&self) -> Option<&str> {
        self.item_id.as_ref().and_then(|i| i.label("details"))
    }

    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }
}
