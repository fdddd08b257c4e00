//! In-memory implementation of DataService for testing and development

use crate::core::error::{AdminError, AdminResult, StoreError};
use crate::core::query::{FindQuery, FindResult};
use crate::core::{DataService, Entity};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory document collection
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Documents are schema-checked on every write, like a backend model would.
/// Without a sort, `find` returns documents in creation order.
#[derive(Clone)]
pub struct InMemoryDataService<T: Entity> {
    service: String,
    documents: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryDataService<T> {
    /// Create an empty collection named after the entity's resource
    pub fn new() -> Self {
        Self::named(T::resource_name())
    }

    /// Create an empty collection under a custom service name
    pub fn named(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a collection pre-filled with `documents`, bypassing schema checks
    pub fn seeded(documents: impl IntoIterator<Item = T>) -> Self {
        let service = Self::new();
        if let Ok(mut map) = service.documents.write() {
            map.extend(documents.into_iter().map(|d| (d.id(), d)));
        }
        service
    }

    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// Number of stored documents
    pub fn len(&self) -> AdminResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> AdminResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Uuid, T>>, StoreError> {
        self.documents.read().map_err(|e| {
            tracing::error!(service = %self.service, "Failed to acquire read lock: {}", e);
            StoreError::LockPoisoned {
                service: self.service.clone(),
            }
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<Uuid, T>>, StoreError> {
        self.documents.write().map_err(|e| {
            tracing::error!(service = %self.service, "Failed to acquire write lock: {}", e);
            StoreError::LockPoisoned {
                service: self.service.clone(),
            }
        })
    }

    fn not_found(&self, id: &Uuid) -> AdminError {
        StoreError::not_found(T::resource_name_singular(), *id).into()
    }
}

impl<T: Entity> Default for InMemoryDataService<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> DataService<T> for InMemoryDataService<T> {
    async fn create(&self, entity: T) -> AdminResult<T> {
        entity.check_schema()?;

        let mut documents = self.write()?;
        if documents.contains_key(&entity.id()) {
            return Err(StoreError::Operation {
                service: self.service.clone(),
                operation: "create".to_string(),
                message: format!("duplicate id {}", entity.id()),
            }
            .into());
        }
        documents.insert(entity.id(), entity.clone());

        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> AdminResult<T> {
        let documents = self.read()?;
        documents.get(id).cloned().ok_or_else(|| self.not_found(id))
    }

    async fn patch(&self, id: &Uuid, patch: T::Patch) -> AdminResult<T> {
        let mut documents = self.write()?;
        let current = documents.get(id).ok_or_else(|| self.not_found(id))?;

        let mut updated = current.clone();
        updated.apply_patch(patch);
        updated.check_schema()?;

        documents.insert(*id, updated.clone());
        Ok(updated)
    }

    async fn update(&self, id: &Uuid, entity: T) -> AdminResult<T> {
        if entity.id() != *id {
            return Err(StoreError::Operation {
                service: self.service.clone(),
                operation: "update".to_string(),
                message: format!("document id {} does not match {}", entity.id(), id),
            }
            .into());
        }
        entity.check_schema()?;

        let mut documents = self.write()?;
        if !documents.contains_key(id) {
            return Err(self.not_found(id));
        }
        documents.insert(*id, entity.clone());

        Ok(entity)
    }

    async fn find(&self, query: &FindQuery) -> AdminResult<FindResult<T>> {
        let documents = self.read()?;

        let mut matching: Vec<T> = documents
            .values()
            .filter(|doc| query.matches_id(&doc.id()))
            .cloned()
            .collect();
        drop(documents);

        matching.sort_by_key(|doc| (doc.created_at(), doc.id()));

        if let Some(sort) = &query.sort {
            let mut keyed = matching
                .into_iter()
                .map(|doc| serde_json::to_value(&doc).map(|json| (json, doc)))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AdminError::Internal(e.to_string()))?;
            keyed.sort_by(|(a, _), (b, _)| sort.compare(a, b));
            matching = keyed.into_iter().map(|(_, doc)| doc).collect();
        }

        let total = matching.len();
        let data = matching
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect();

        Ok(FindResult {
            total,
            limit: query.limit,
            skip: query.skip,
            data,
        })
    }

    async fn remove(&self, id: &Uuid) -> AdminResult<T> {
        let mut documents = self.write()?;
        documents.remove(id).ok_or_else(|| self.not_found(id))
    }
}
