//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Schema violations surface per field with camelCase names
//! - Error matching allows the save boundary to map errors to fields

use axum::http::StatusCode;
use axum::response::IntoResponse;
use desk::core::error::{ConfigError, FieldValidationError};
use desk::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_not_found_returns_404() {
        let err: AdminError = StoreError::not_found("invoice", Uuid::new_v4()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_field_errors_return_422() {
        let err: AdminError = ValidationError::FieldErrors(vec![FieldValidationError::new(
            "quantity",
            "Quantity must be greater than 0",
        )])
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_json_returns_400() {
        let err: AdminError = ValidationError::InvalidJson {
            message: "expected value".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_unavailable_returns_503() {
        let err: AdminError = StoreError::Unavailable {
            service: "items".to_string(),
            message: "connection refused".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.is_validation());
    }

    #[test]
    fn test_unauthorized_returns_401() {
        let err = AdminError::Unauthorized {
            message: "no user".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_config_error_returns_500() {
        let err: AdminError = ConfigError::InvalidValue {
            field: "query.list_limit".to_string(),
            message: "must be greater than 0".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}

// =============================================================================
// Schema Violation Tests
// =============================================================================

mod schema_tests {
    use super::*;

    #[test]
    fn test_invoice_bounds_reported_in_camel_case() {
        let mut invoice = Invoice::new(Uuid::new_v4());
        invoice.sub_total = Some(20_000_000.0);
        invoice.discount = Some(2_000_000.0);

        let err: AdminError = invoice.check_schema().unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "SCHEMA_VIOLATION");

        let fields = err.field_messages().unwrap();
        assert!(fields.contains_key("subTotal"));
        assert!(fields.contains_key("discount"));
        assert!(fields["subTotal"].contains("maximum allowed value"));
    }

    #[tokio::test]
    async fn test_store_rejects_out_of_bounds_patch() {
        let service = InMemoryDataService::<Invoice>::new();
        let invoice = service.create(Invoice::new(Uuid::new_v4())).await.unwrap();

        let err = service
            .patch(
                &invoice.id,
                InvoicePatch {
                    total: Some(1_000_001.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            AdminError::Schema(schema) => {
                assert_eq!(schema.resource, "invoice");
                assert_eq!(schema.violations[0].field, "total");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_not_found_response_details() {
        let id = Uuid::new_v4();
        let err: AdminError = StoreError::not_found("item", id).into();
        let response = err.to_response();

        assert_eq!(response.code, "DOCUMENT_NOT_FOUND");
        let details = response.details.unwrap();
        assert_eq!(details["resource"], "item");
        assert_eq!(details["id"], id.to_string());
    }

    #[test]
    fn test_validation_response_lists_fields() {
        let err: AdminError = ValidationError::FieldErrors(vec![
            FieldValidationError::new("companyId", "Company is required"),
            FieldValidationError::new("itemId", "Item is required"),
        ])
        .into();
        let response = err.to_response();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["fields"]["companyId"], "Company is required");
        assert_eq!(json["details"]["fields"]["itemId"], "Item is required");
    }

    #[test]
    fn test_internal_response_has_no_details() {
        let err = AdminError::Internal("boom".to_string());
        let json = serde_json::to_value(err.to_response()).unwrap();
        assert!(json.get("details").is_none());
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_store_error_into_response_status() {
        let err: AdminError = StoreError::not_found("company", Uuid::nil()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_reconciliation_error_into_response_status() {
        let err = AdminError::ReconciliationIncomplete {
            cause: StoreError::LockPoisoned {
                service: "items".to_string(),
            },
            residue: vec!["return 4 to item".to_string()],
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    fn describe(err: &AdminError) -> &'static str {
        match err {
            AdminError::Validation(_) => "fix the form",
            AdminError::Schema(_) => "value out of range",
            AdminError::Store(StoreError::NotFound { .. }) => "gone",
            AdminError::Store(_) => "retry later",
            AdminError::Unauthorized { .. } => "sign in",
            _ => "contact support",
        }
    }

    #[test]
    fn test_match_categories() {
        assert_eq!(
            describe(&StoreError::not_found("item", Uuid::nil()).into()),
            "gone"
        );
        assert_eq!(
            describe(&AdminError::Unauthorized {
                message: String::new()
            }),
            "sign in"
        );
        assert_eq!(
            describe(&AdminError::Internal("x".to_string())),
            "contact support"
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = AdminError::ReconciliationIncomplete {
            cause: StoreError::Unavailable {
                service: "items".to_string(),
                message: "down".to_string(),
            },
            residue: Vec::new(),
        };
        let source = err.source().expect("cause is the source");
        assert!(source.to_string().contains("down"));
    }
}
