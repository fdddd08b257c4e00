//! Service traits for document collections

use crate::core::Entity;
use crate::core::error::{AdminError, AdminResult};
use crate::core::query::{FindQuery, FindResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Service trait for a collection of documents
///
/// Implementations provide the document-store RPC surface for one entity
/// type. The workflow code is agnostic to the underlying storage mechanism.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// Create a new document; fails with a schema error on bound violation
    async fn create(&self, entity: T) -> AdminResult<T>;

    /// Get a document by ID
    async fn get(&self, id: &Uuid) -> AdminResult<T>;

    /// Apply a partial update and return the stored document
    async fn patch(&self, id: &Uuid, patch: T::Patch) -> AdminResult<T>;

    /// Replace a whole document, keeping its id
    async fn update(&self, id: &Uuid, entity: T) -> AdminResult<T>;

    /// Find documents matching a query
    ///
    /// `query.populate` is not applied here; see `Populator`.
    async fn find(&self, query: &FindQuery) -> AdminResult<FindResult<T>>;

    /// Remove a document and return it
    async fn remove(&self, id: &Uuid) -> AdminResult<T>;
}

/// Fetches documents of one service as JSON, for populating references
#[async_trait]
pub trait EntityFetcher: Send + Sync {
    /// Fetch a document; `Ok(None)` when it does not exist
    async fn fetch_as_json(&self, id: &Uuid) -> AdminResult<Option<Value>>;
}

/// Adapts any `DataService<T>` into an [`EntityFetcher`]
pub struct ServiceFetcher<T: Entity> {
    service: Arc<dyn DataService<T>>,
}

impl<T: Entity> ServiceFetcher<T> {
    pub fn new(service: Arc<dyn DataService<T>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<T: Entity> EntityFetcher for ServiceFetcher<T> {
    async fn fetch_as_json(&self, id: &Uuid) -> AdminResult<Option<Value>> {
        match self.service.get(id).await {
            Ok(entity) => serde_json::to_value(entity)
                .map(Some)
                .map_err(|e| AdminError::Internal(e.to_string())),
            Err(AdminError::Store(crate::core::StoreError::NotFound { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
