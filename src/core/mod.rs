//! Core module containing fundamental traits and types for the crate

pub mod alerts;
pub mod auth;
pub mod entity;
pub mod error;
pub mod populate;
pub mod query;
pub mod service;

pub use alerts::{Alert, AlertBus, AlertSink, Severity};
pub use auth::AuthContext;
pub use entity::{Entity, Patch};
pub use error::{AdminError, AdminResult, SchemaError, StoreError, ValidationError};
pub use populate::Populator;
pub use query::{FindQuery, FindResult, Populate, Sort};
pub use service::{DataService, EntityFetcher, ServiceFetcher};
