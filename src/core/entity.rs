//! Entity traits defining the core abstraction for all document types

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::SchemaError;

/// Base trait for every document stored in a collection.
///
/// All documents have:
/// - id: Unique identifier (`_id` on the wire)
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
///
/// Field bounds are declared with `validator` attributes and checked by the
/// store on every create and patch through [`Entity::check_schema`].
pub trait Entity: Clone + Serialize + DeserializeOwned + Validate + Send + Sync + 'static {
    /// Partial update record accepted by `DataService::patch`
    type Patch: Patch<Self> + Send + Sync;

    /// The plural resource name, also the default service name (e.g., "invoices")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "invoice")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this document
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Refresh the update timestamp
    fn touch(&mut self);

    /// Apply a partial update and refresh the update timestamp
    fn apply_patch(&mut self, patch: Self::Patch) {
        patch.apply_to(self);
        self.touch();
    }

    /// Check declared field bounds
    fn check_schema(&self) -> Result<(), SchemaError> {
        self.validate()
            .map_err(|report| SchemaError::from_report(Self::resource_name_singular(), &report))
    }
}

/// A partial update for documents of type `T`
///
/// `None` fields leave the target untouched.
pub trait Patch<T> {
    fn apply_to(self, target: &mut T);

    /// Whether applying this patch would change nothing
    fn is_empty(&self) -> bool;
}
