//! # invoice-desk
//!
//! Business core of a CRUD admin backend for invoices, items and companies.
//!
//! ## Features
//!
//! - **Document Services**: async `DataService` trait over collections, with an in-memory store
//! - **Reference Population**: resolve `companyId`/`itemId` into projected documents
//! - **Invoice Pricing**: sub total and total derived from quantity, unit price and discount
//! - **Stock Reconciliation**: item stock kept consistent across invoice create, edit and remove
//! - **Rollback**: committed writes undone in reverse when a later step fails
//! - **Save Boundary**: a dialog type that turns every failure into field errors plus an alert
//! - **Configuration-Based**: service names and workflow switches loaded from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use desk::prelude::*;
//!
//! let config = AdminConfig::default();
//! let services = InvoiceServices::new(
//!     Arc::new(InMemoryDataService::<Invoice>::new()),
//!     Arc::new(InMemoryDataService::seeded([Item::new("Widget", 10.0, 2.5)])),
//!     Arc::new(InMemoryDataService::seeded([Company::new("Acme")])),
//! );
//! let coordinator = Arc::new(StockCoordinator::new(services, &config));
//! let alerts = Arc::new(AlertBus::new(config.alerts.capacity));
//!
//! let mut dialog = InvoiceDialog::open_create(coordinator, alerts, AuthContext::user(user_id)).await;
//! dialog.set_company(Some(company_id));
//! dialog.select_item(Some(item_id)).await;
//! dialog.set_quantity(Some(4.0));
//! let saved = dialog.save().await;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod invoicing;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        alerts::{Alert, AlertBus, AlertSink, Severity},
        auth::AuthContext,
        entity::{Entity, Patch},
        error::{AdminError, AdminResult, SchemaError, StoreError, ValidationError},
        populate::Populator,
        query::{FindQuery, FindResult, Populate, Sort},
        service::{DataService, EntityFetcher, ServiceFetcher},
    };

    // === Macros ===
    pub use crate::{impl_document, impl_patch};

    // === Documents ===
    pub use crate::entities::{
        Company, CompanyPatch, Invoice, InvoicePatch, Item, ItemPatch, PopulatedInvoice, User,
        UserPatch,
    };

    // === Invoicing ===
    pub use crate::invoicing::{
        DialogMode, InvoiceDialog, InvoiceDraft, InvoiceServices, Pricing, SaveFailure,
        SaveStage, StockCoordinator, StockDelta, StockLine,
    };

    // === Storage ===
    pub use crate::storage::InMemoryDataService;

    // === Config ===
    pub use crate::config::AdminConfig;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
