//! Typed error handling for invoice-desk
//!
//! Every fallible operation in the crate returns [`AdminResult`]. The
//! categories mirror how a failure is surfaced to the person filling the
//! invoice form:
//!
//! - [`ValidationError`]: the input itself is wrong (missing selection,
//!   non-positive quantity, quantity above the availability ceiling)
//! - [`StoreError`]: a document-store read or write failed
//! - [`SchemaError`]: the store rejected a document that breaks a field bound
//! - [`ConfigError`]: configuration could not be loaded
//!
//! # Example
//!
//! ```rust,ignore
//! match coordinator.create(&auth, &draft).await {
//!     Ok(invoice) => println!("created {}", invoice.id),
//!     Err(failure) if failure.error.is_validation() => {
//!         // show field messages, nothing was written
//!     }
//!     Err(failure) => eprintln!("{} failed: {}", failure.stage, failure.error),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// The main error type for invoice-desk
#[derive(Debug)]
pub enum AdminError {
    /// Input validation errors, raised before any write
    Validation(ValidationError),

    /// Document-store failures (network, backend, missing documents)
    Store(StoreError),

    /// Backend-side field constraint violations
    Schema(SchemaError),

    /// Configuration errors
    Config(ConfigError),

    /// A write needs a user identity for its audit fields
    Unauthorized { message: String },

    /// A failed save could not be rolled back completely
    ReconciliationIncomplete {
        cause: StoreError,
        residue: Vec<String>,
    },

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::Validation(e) => write!(f, "{}", e),
            AdminError::Store(e) => write!(f, "{}", e),
            AdminError::Schema(e) => write!(f, "{}", e),
            AdminError::Config(e) => write!(f, "{}", e),
            AdminError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            AdminError::ReconciliationIncomplete { cause, residue } => write!(
                f,
                "Stock reconciliation incomplete after '{}' ({} change(s) left in place)",
                cause,
                residue.len()
            ),
            AdminError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdminError::Validation(e) => Some(e),
            AdminError::Store(e) => Some(e),
            AdminError::Schema(e) => Some(e),
            AdminError::Config(e) => Some(e),
            AdminError::ReconciliationIncomplete { cause, .. } => Some(cause),
            AdminError::Unauthorized { .. } | AdminError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AdminError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Validation(e) => e.status_code(),
            AdminError::Store(e) => e.status_code(),
            AdminError::Schema(_) => StatusCode::BAD_REQUEST,
            AdminError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AdminError::ReconciliationIncomplete { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Validation(e) => e.error_code(),
            AdminError::Store(e) => e.error_code(),
            AdminError::Schema(_) => "SCHEMA_VIOLATION",
            AdminError::Config(_) => "CONFIG_ERROR",
            AdminError::Unauthorized { .. } => "UNAUTHORIZED",
            AdminError::ReconciliationIncomplete { .. } => "RECONCILIATION_INCOMPLETE",
            AdminError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure happened before anything was written
    pub fn is_validation(&self) -> bool {
        matches!(self, AdminError::Validation(_))
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Per-field messages, when the error carries them
    ///
    /// Keys use the document's JSON field names (`companyId`, `quantity`, ...).
    pub fn field_messages(&self) -> Option<BTreeMap<String, String>> {
        match self {
            AdminError::Validation(ValidationError::FieldErrors(errors)) => Some(
                errors
                    .iter()
                    .map(|e| (e.field.clone(), e.message.clone()))
                    .collect(),
            ),
            AdminError::Schema(schema) if !schema.violations.is_empty() => Some(
                schema
                    .violations
                    .iter()
                    .map(|v| (v.field.clone(), v.message.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AdminError::Store(StoreError::NotFound { resource, id }) => Some(serde_json::json!({
                "resource": resource,
                "id": id.to_string()
            })),
            AdminError::ReconciliationIncomplete { residue, .. } => {
                Some(serde_json::json!({ "residue": residue }))
            }
            other => other
                .field_messages()
                .map(|fields| serde_json::json!({ "fields": fields })),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// One or more form fields are invalid
    FieldErrors(Vec<FieldValidationError>),

    /// Request payload is not valid JSON
    InvalidJson { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let parts: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation failed: {}", parts.join(", "))
            }
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::FieldErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }

    /// Message recorded for `field`, if any
    pub fn message_for(&self, field: &str) -> Option<&str> {
        match self {
            ValidationError::FieldErrors(errors) => errors
                .iter()
                .find(|e| e.field == field)
                .map(|e| e.message.as_str()),
            ValidationError::InvalidJson { .. } => None,
        }
    }
}

impl From<ValidationError> for AdminError {
    fn from(err: ValidationError) -> Self {
        AdminError::Validation(err)
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by document-store collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The document does not exist
    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: Uuid },

    /// The backing service could not be reached
    #[error("Service '{service}' is unavailable: {message}")]
    Unavailable { service: String, message: String },

    /// The backend refused or failed an operation
    #[error("{service} {operation} failed: {message}")]
    Operation {
        service: String,
        operation: String,
        message: String,
    },

    /// In-process storage lock was poisoned by a panicking writer
    #[error("Storage for '{service}' is poisoned")]
    LockPoisoned { service: String },
}

impl StoreError {
    pub fn not_found(resource: impl Into<String>, id: Uuid) -> Self {
        StoreError::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Operation { .. } | StoreError::LockPoisoned { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "DOCUMENT_NOT_FOUND",
            StoreError::Unavailable { .. } => "STORE_UNAVAILABLE",
            StoreError::Operation { .. } => "STORE_OPERATION_FAILED",
            StoreError::LockPoisoned { .. } => "STORE_POISONED",
        }
    }
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        AdminError::Store(err)
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// One violated field constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaViolation {
    pub field: String,
    pub message: String,
}

/// A document was rejected because it breaks a declared field bound
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    pub resource: String,
    pub violations: Vec<SchemaViolation>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return write!(f, "{} validation failed", self.resource);
        }
        let parts: Vec<&str> = self.violations.iter().map(|v| v.message.as_str()).collect();
        write!(f, "{} validation failed: {}", self.resource, parts.join("; "))
    }
}

impl std::error::Error for SchemaError {}

impl SchemaError {
    /// Build from the `validator` crate's report
    ///
    /// Field names are converted to the camelCase names used on the wire.
    pub fn from_report(resource: &str, report: &validator::ValidationErrors) -> Self {
        let mut violations: Vec<SchemaViolation> = report
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = camel_case(&field);
                errors.iter().map(move |error| SchemaViolation {
                    message: violation_message(resource, &field, error),
                    field: field.clone(),
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));

        Self {
            resource: resource.to_string(),
            violations,
        }
    }
}

impl From<SchemaError> for AdminError {
    fn from(err: SchemaError) -> Self {
        AdminError::Schema(err)
    }
}

fn violation_message(resource: &str, field: &str, error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let value = error.params.get("value").map(|v| v.to_string());
    match (error.code.as_ref(), error.params.get("max")) {
        ("range", Some(max)) => format!(
            "Path `{}` ({}) is more than maximum allowed value ({}).",
            field,
            value.unwrap_or_default(),
            max
        ),
        (code, _) => format!("{} validation failed: {} is invalid ({})", resource, field, code),
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found or unreadable
    #[error("Configuration file '{path}' could not be read: {message}")]
    Unreadable { path: String, message: String },

    /// YAML parse error
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of its allowed range
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<ConfigError> for AdminError {
    fn from(err: ConfigError) -> Self {
        AdminError::Config(err)
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        AdminError::Internal(err.to_string())
    }
}

/// A specialized Result type for invoice-desk operations
pub type AdminResult<T> = Result<T, AdminError>;

// =============================================================================
// Tests
// =============================================================================
