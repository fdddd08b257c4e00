//! Invoice workflow: pricing, stock reconciliation and the save boundary

pub mod compensation;
pub mod coordinator;
pub mod dialog;
pub mod draft;
pub mod pricing;
pub mod reconcile;

pub use compensation::{Compensation, CompensationLog};
pub use coordinator::{
    InvoiceServices, ItemSelection, SaveFailure, SaveStage, SelectOption, StockCoordinator,
};
pub use dialog::{DialogMode, InvoiceDialog};
pub use draft::InvoiceDraft;
pub use pricing::Pricing;
pub use reconcile::{StockDelta, StockLine};
