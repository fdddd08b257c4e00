//! Editable invoice form state

use crate::core::error::{FieldValidationError, ValidationError};
use crate::entities::Invoice;
use crate::invoicing::pricing::{self, Pricing};
use crate::invoicing::reconcile::StockLine;
use uuid::Uuid;

pub const COMPANY_REQUIRED: &str = "Company is required";
pub const ITEM_REQUIRED: &str = "Item is required";
pub const QUANTITY_NOT_POSITIVE: &str = "Quantity must be greater than 0";

/// Message for a quantity above the availability ceiling
pub fn over_availability(available: f64) -> String {
    format!("Cannot invoice more than available ({})", available)
}

/// User input for one invoice, plus its derived prices
///
/// Setters only store input. Derived fields change when
/// [`InvoiceDraft::recompute`] runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceDraft {
    company_id: Option<Uuid>,
    item_id: Option<Uuid>,
    quantity: Option<f64>,
    discount: Option<f64>,
    unit_price: f64,
    pricing: Pricing,
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a stored invoice; prices stay as stored until the next recompute
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            company_id: invoice.company_id,
            item_id: invoice.item_id,
            quantity: invoice.quantity,
            discount: invoice.discount.map(|d| pricing::clamp_discount(Some(d))),
            unit_price: 0.0,
            pricing: Pricing {
                sub_total: invoice.sub_total(),
                total: invoice.total(),
            },
        }
    }

    pub fn set_company(&mut self, company_id: Option<Uuid>) -> &mut Self {
        self.company_id = company_id;
        self
    }

    /// Select an item together with its unit price
    pub fn set_item(&mut self, item_id: Option<Uuid>, unit_price: f64) -> &mut Self {
        self.item_id = item_id;
        self.unit_price = pricing::sanitize(Some(unit_price));
        self
    }

    pub fn set_unit_price(&mut self, unit_price: f64) -> &mut Self {
        self.unit_price = pricing::sanitize(Some(unit_price));
        self
    }

    pub fn set_quantity(&mut self, quantity: Option<f64>) -> &mut Self {
        self.quantity = quantity;
        self
    }

    /// Set the discount percentage, clamped into `[0, 100]`
    pub fn set_discount(&mut self, discount: Option<f64>) -> &mut Self {
        self.discount = discount.map(|d| pricing::clamp_discount(Some(d)));
        self
    }

    /// Re-derive sub total and total from the current input
    pub fn recompute(&mut self) -> Pricing {
        self.pricing = Pricing::derive(self.quantity, Some(self.unit_price), self.discount);
        self.pricing
    }

    pub fn company_id(&self) -> Option<Uuid> {
        self.company_id
    }

    pub fn item_id(&self) -> Option<Uuid> {
        self.item_id
    }

    pub fn quantity(&self) -> f64 {
        pricing::sanitize(self.quantity)
    }

    pub fn discount(&self) -> f64 {
        pricing::clamp_discount(self.discount)
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    /// The stock this draft would hold, once an item is chosen
    pub fn stock_line(&self) -> Option<StockLine> {
        self.item_id.map(|id| StockLine::new(id, self.quantity()))
    }

    /// Required-field and positivity checks; needs no store access
    pub fn validate_fields(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.company_id.is_none() {
            errors.push(FieldValidationError::new("companyId", COMPANY_REQUIRED));
        }
        if self.item_id.is_none() {
            errors.push(FieldValidationError::new("itemId", ITEM_REQUIRED));
        }
        if self.quantity() <= 0.0 {
            errors.push(FieldValidationError::new("quantity", QUANTITY_NOT_POSITIVE));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }

    /// Reject a quantity above `available`
    pub fn check_availability(&self, available: f64) -> Result<(), ValidationError> {
        if self.quantity() > available {
            return Err(ValidationError::FieldErrors(vec![FieldValidationError::new(
                "quantity",
                over_availability(available),
            )]));
        }
        Ok(())
    }
}
