//! Reference population for find results
//!
//! Resolves `Populate` specs against registered services: each reference
//! field holding an id is replaced by `{ "_id": id, <selected fields> }`.
//! A reference whose document no longer exists keeps only its `_id`.

use crate::core::error::{AdminError, AdminResult, StoreError};
use crate::core::query::Populate;
use crate::core::service::EntityFetcher;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Resolves references through a registry of per-service fetchers
#[derive(Clone, Default)]
pub struct Populator {
    fetchers: HashMap<String, Arc<dyn EntityFetcher>>,
}

impl Populator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the fetcher used for `service`
    pub fn register(mut self, service: impl Into<String>, fetcher: Arc<dyn EntityFetcher>) -> Self {
        self.fetchers.insert(service.into(), fetcher);
        self
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.fetchers.contains_key(service)
    }

    /// Serialize `docs` and resolve every spec on each of them
    pub async fn populate<T: Serialize>(
        &self,
        docs: Vec<T>,
        specs: &[Populate],
    ) -> AdminResult<Vec<Value>> {
        let mut cache: HashMap<(String, Uuid), Option<Value>> = HashMap::new();
        let mut out = Vec::with_capacity(docs.len());

        for doc in docs {
            let mut value =
                serde_json::to_value(doc).map_err(|e| AdminError::Internal(e.to_string()))?;

            if let Value::Object(fields) = &mut value {
                for spec in specs {
                    let Some(id) = fields.get(&spec.path).and_then(reference_id) else {
                        continue;
                    };

                    let key = (spec.service.clone(), id);
                    let referenced = match cache.get(&key) {
                        Some(hit) => hit.clone(),
                        None => {
                            let fetched = self.fetcher(&spec.service)?.fetch_as_json(&id).await?;
                            cache.insert(key, fetched.clone());
                            fetched
                        }
                    };

                    if referenced.is_none() {
                        tracing::debug!(
                            path = %spec.path,
                            service = %spec.service,
                            id = %id,
                            "populate target missing, keeping bare reference"
                        );
                    }
                    fields.insert(spec.path.clone(), project(id, referenced.as_ref(), &spec.select));
                }
            }

            out.push(value);
        }

        Ok(out)
    }

    fn fetcher(&self, service: &str) -> AdminResult<&Arc<dyn EntityFetcher>> {
        self.fetchers.get(service).ok_or_else(|| {
            StoreError::Unavailable {
                service: service.to_string(),
                message: "no service registered for populate".to_string(),
            }
            .into()
        })
    }
}

fn reference_id(value: &Value) -> Option<Uuid> {
    match value {
        Value::String(s) => Uuid::parse_str(s).ok(),
        Value::Object(obj) => obj.get("_id").and_then(reference_id),
        _ => None,
    }
}

fn project(id: Uuid, referenced: Option<&Value>, select: &[String]) -> Value {
    let mut projected = Map::new();
    projected.insert("_id".to_string(), Value::String(id.to_string()));
    if let Some(Value::Object(source)) = referenced {
        for field in select {
            if let Some(v) = source.get(field) {
                projected.insert(field.clone(), v.clone());
            }
        }
    }
    Value::Object(projected)
}
