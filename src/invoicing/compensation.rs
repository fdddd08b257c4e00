//! Compensating-action log for multi-step saves
//!
//! Every write a save commits records the action that undoes it. When a later
//! step fails, [`CompensationLog::unwind`] runs the recorded actions newest
//! first. There is no isolation: a concurrent writer can still interleave.

use crate::core::error::AdminError;
use crate::entities::Invoice;
use crate::invoicing::coordinator::InvoiceServices;
use crate::invoicing::reconcile::{StockDelta, apply_stock_delta};
use std::fmt;
use uuid::Uuid;

/// The inverse of one committed write
#[derive(Debug, Clone, PartialEq)]
pub enum Compensation {
    /// Undo an invoice create
    RemoveInvoice { invoice_id: Uuid },

    /// Undo an invoice patch by writing the previous document back
    RestoreInvoice { previous: Box<Invoice> },

    /// Undo an invoice remove
    RecreateInvoice { removed: Box<Invoice> },

    /// Undo a stock change
    RevertStock { applied: StockDelta },
}

impl Compensation {
    async fn run(&self, services: &InvoiceServices) -> Result<(), AdminError> {
        match self {
            Compensation::RemoveInvoice { invoice_id } => {
                services.invoices.remove(invoice_id).await.map(|_| ())
            }
            Compensation::RestoreInvoice { previous } => services
                .invoices
                .update(&previous.id, previous.as_ref().clone())
                .await
                .map(|_| ()),
            Compensation::RecreateInvoice { removed } => services
                .invoices
                .create(removed.as_ref().clone())
                .await
                .map(|_| ()),
            Compensation::RevertStock { applied } => {
                apply_stock_delta(services.items.as_ref(), applied.inverse())
                    .await
                    .map(|_| ())
            }
        }
    }
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compensation::RemoveInvoice { invoice_id } => {
                write!(f, "remove invoice {}", invoice_id)
            }
            Compensation::RestoreInvoice { previous } => {
                write!(f, "restore invoice {}", previous.id)
            }
            Compensation::RecreateInvoice { removed } => {
                write!(f, "recreate invoice {}", removed.id)
            }
            Compensation::RevertStock { applied } => {
                write!(f, "return {} to item {}", -applied.delta, applied.item_id)
            }
        }
    }
}

/// Ordered record of the inverses of committed writes
#[derive(Debug, Clone, Default)]
pub struct CompensationLog {
    entries: Vec<Compensation>,
}

impl CompensationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, compensation: Compensation) {
        self.entries.push(compensation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Compensation] {
        &self.entries
    }

    /// Run every recorded inverse, newest first
    ///
    /// A failing inverse does not stop the others. Returns the number of
    /// inverses applied, or a description of each one that failed.
    pub async fn unwind(self, services: &InvoiceServices) -> Result<usize, Vec<String>> {
        let mut applied = 0;
        let mut residue = Vec::new();

        for compensation in self.entries.into_iter().rev() {
            match compensation.run(services).await {
                Ok(()) => {
                    tracing::debug!(action = %compensation, "compensation applied");
                    applied += 1;
                }
                Err(e) => {
                    tracing::error!(action = %compensation, error = %e, "compensation failed");
                    residue.push(format!("{}: {}", compensation, e));
                }
            }
        }

        if residue.is_empty() {
            Ok(applied)
        } else {
            Err(residue)
        }
    }
}
