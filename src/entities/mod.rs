//! Document types stored by the admin backend

pub mod company;
pub mod invoice;
pub mod item;
pub mod macros;
pub mod user;

pub use company::{Company, CompanyPatch};
pub use invoice::{Invoice, InvoicePatch, PopulatedInvoice, Reference};
pub use item::{Item, ItemPatch};
pub use user::{User, UserPatch};
