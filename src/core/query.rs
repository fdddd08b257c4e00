//! Find queries and paginated results

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

/// Default page size used by list and option queries
pub const DEFAULT_LIMIT: usize = 10_000;

/// Query accepted by `DataService::find`
///
/// # Example
/// ```rust,ignore
/// let query = FindQuery::new()
///     .with_limit(10_000)
///     .with_ids([invoice_id])
///     .populate(Populate::new("companyId", "companies", ["name"]));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindQuery {
    /// Maximum number of documents returned
    pub limit: usize,

    /// Number of matching documents skipped before the page starts
    pub skip: usize,

    /// Restrict to this id set (`_id: { $in: [...] }`)
    pub ids: Option<Vec<Uuid>>,

    /// Sort order
    pub sort: Option<Sort>,

    /// References to resolve on the returned documents
    pub populate: Vec<Populate>,
}

impl Default for FindQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
            ids: None,
            sort: None,
            populate: Vec::new(),
        }
    }
}

impl FindQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn sorted_by(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn populate(mut self, spec: Populate) -> Self {
        self.populate.push(spec);
        self
    }

    /// Check whether a document id passes the id filter
    pub fn matches_id(&self, id: &Uuid) -> bool {
        self.ids.as_ref().is_none_or(|ids| ids.contains(id))
    }
}

/// Sort expression over a JSON field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Field name as serialized (e.g., "createdAt")
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parse `field`, `field:asc` or `field:desc`
    pub fn parse(expr: &str) -> Self {
        match expr.split_once(':') {
            Some((field, "desc")) => Self::desc(field),
            Some((field, _)) => Self::asc(field),
            None => Self::asc(expr),
        }
    }

    /// Compare two serialized documents on this sort field
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ordering = compare_json(a.get(&self.field), b.get(&self.field));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Resolve a reference field to selected fields of the referenced document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Populate {
    /// Reference field on the queried document (e.g., "itemId")
    pub path: String,

    /// Service holding the referenced documents (e.g., "items")
    pub service: String,

    /// Fields projected from the referenced document
    pub select: Vec<String>,
}

impl Populate {
    pub fn new<S: Into<String>>(
        path: impl Into<String>,
        service: impl Into<String>,
        select: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            path: path.into(),
            service: service.into(),
            select: select.into_iter().map(Into::into).collect(),
        }
    }
}

/// Paginated find result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindResult<T> {
    /// Number of documents matching the filter (before limit/skip)
    pub total: usize,
    pub limit: usize,
    pub skip: usize,
    pub data: Vec<T>,
}

impl<T> FindResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> FindResult<U> {
        FindResult {
            total: self.total,
            limit: self.limit,
            skip: self.skip,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
