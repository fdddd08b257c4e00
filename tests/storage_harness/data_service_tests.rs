//! Macro-generated test suite for `DataService<TestRecord>` contract validation.
//!
//! The `data_service_tests!` macro generates a test module that validates any
//! `DataService<TestRecord>` implementation against the full contract: CRUD,
//! find with id filters, sorting and paging, schema enforcement, and
//! concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use desk::storage::InMemoryDataService;
//!
//! data_service_tests!(InMemoryDataService::<TestRecord>::new());
//! ```

/// Generate a full `DataService<TestRecord>` conformance test suite.
///
/// `$factory` must be an expression that evaluates to an instance implementing
/// `DataService<TestRecord>`. It is re-evaluated for each test to ensure
/// isolation. For the concurrent access test, the returned service must also
/// implement `Clone + 'static` (shared state via Arc pattern).
#[macro_export]
macro_rules! data_service_tests {
    ($factory:expr) => {
        mod data_service_contract_tests {
            use super::*;
            use desk::core::entity::Entity;
            use desk::core::error::{AdminError, StoreError};
            use desk::core::query::{FindQuery, Sort};
            use desk::core::service::DataService;
            use uuid::Uuid;

            // ==================================================================
            // CRUD: Create & Get
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let service = $factory;
                let record = create_test_record("Alice", 42.5, true);
                let original_id = record.id;

                let created = service.create(record).await.unwrap();
                assert_eq!(created.id(), original_id);
                assert_eq!(created.name, "Alice");

                let retrieved = service.get(&original_id).await.unwrap();
                assert_eq!(retrieved.id(), original_id);
                assert_eq!(retrieved.name, "Alice");
                assert!((retrieved.score - 42.5).abs() < f64::EPSILON);
                assert!(retrieved.active);
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let service = $factory;

                let err = service.get(&Uuid::new_v4()).await.unwrap_err();
                assert!(
                    matches!(err, AdminError::Store(StoreError::NotFound { .. })),
                    "Getting a nonexistent document should be NotFound, got {:?}",
                    err
                );
                assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_create_schema_violation() {
                let service = $factory;
                let record = create_test_record("Over", 150.0, true);
                let id = record.id;

                let err = service.create(record).await.unwrap_err();
                let fields = err.field_messages().expect("schema errors carry fields");
                assert!(fields.contains_key("score"));
                assert!(service.get(&id).await.is_err(), "Nothing should be stored");
            }

            #[tokio::test]
            async fn test_create_duplicate_id() {
                let service = $factory;
                let record = create_test_record("Once", 1.0, true);

                service.create(record.clone()).await.unwrap();
                assert!(service.create(record).await.is_err());
            }

            // ==================================================================
            // Find
            // ==================================================================

            #[tokio::test]
            async fn test_find_empty() {
                let service = $factory;

                let result = service.find(&FindQuery::new()).await.unwrap();
                assert_eq!(result.total, 0);
                assert!(result.data.is_empty());
            }

            #[tokio::test]
            async fn test_find_multiple_in_creation_order() {
                let service = $factory;
                let batch = sample_batch(5);
                let expected: Vec<Uuid> = batch.iter().map(|r| r.id).collect();

                for record in batch {
                    service.create(record).await.unwrap();
                }

                let result = service.find(&FindQuery::new()).await.unwrap();
                assert_count(&result.data, 5);
                let ids: Vec<Uuid> = result.data.iter().map(|r| r.id()).collect();
                assert_eq!(ids, expected);
            }

            #[tokio::test]
            async fn test_find_sorted() {
                let service = $factory;
                for record in sample_batch(5) {
                    service.create(record).await.unwrap();
                }

                let newest_first = service
                    .find(&FindQuery::new().sorted_by(Sort::desc("createdAt")))
                    .await
                    .unwrap();
                assert_eq!(newest_first.data[0].name, "Record_4");

                let by_score = service
                    .find(&FindQuery::new().sorted_by(Sort::asc("score")))
                    .await
                    .unwrap();
                let scores: Vec<f64> = by_score.data.iter().map(|r| r.score).collect();
                assert_eq!(scores, vec![50.0, 60.0, 70.0, 80.0, 90.0]);
            }

            #[tokio::test]
            async fn test_find_paged() {
                let service = $factory;
                for record in sample_batch(5) {
                    service.create(record).await.unwrap();
                }

                let page = service
                    .find(&FindQuery::new().with_skip(1).with_limit(2))
                    .await
                    .unwrap();
                assert_eq!(page.total, 5);
                assert_eq!(page.skip, 1);
                assert_eq!(page.limit, 2);
                let names: Vec<&str> = page.data.iter().map(|r| r.name.as_str()).collect();
                assert_eq!(names, vec!["Record_1", "Record_2"]);
            }

            #[tokio::test]
            async fn test_find_by_ids() {
                let service = $factory;
                let batch = sample_batch(4);
                let wanted = [batch[1].id, batch[3].id];
                for record in batch {
                    service.create(record).await.unwrap();
                }

                let result = service
                    .find(&FindQuery::new().with_ids(wanted))
                    .await
                    .unwrap();
                assert_eq!(result.total, 2);
                assert!(result.data.iter().all(|r| wanted.contains(&r.id)));
            }

            // ==================================================================
            // Patch & Update
            // ==================================================================

            #[tokio::test]
            async fn test_patch_existing() {
                let service = $factory;
                let record = service
                    .create(create_test_record("Before", 10.0, true))
                    .await
                    .unwrap();

                let patched = service
                    .patch(
                        &record.id,
                        TestRecordPatch {
                            name: Some("After".to_string()),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
                assert_eq!(patched.name, "After");
                assert!((patched.score - 10.0).abs() < f64::EPSILON);
                assert!(patched.updated_at() >= record.updated_at());

                assert_eq!(service.get(&record.id).await.unwrap().name, "After");
            }

            #[tokio::test]
            async fn test_patch_nonexistent() {
                let service = $factory;
                let result = service
                    .patch(&Uuid::new_v4(), TestRecordPatch::default())
                    .await;
                assert!(result.is_err(), "Patching an unknown id should fail");
            }

            #[tokio::test]
            async fn test_patch_schema_violation_keeps_document() {
                let service = $factory;
                let record = service
                    .create(create_test_record("Bounded", 10.0, true))
                    .await
                    .unwrap();

                let err = service
                    .patch(
                        &record.id,
                        TestRecordPatch {
                            score: Some(-1.0),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap_err();
                assert!(matches!(err, AdminError::Schema(_)));
                assert!((service.get(&record.id).await.unwrap().score - 10.0).abs() < f64::EPSILON);
            }

            #[tokio::test]
            async fn test_update_existing() {
                let service = $factory;
                let record = service
                    .create(create_test_record("Original", 10.0, true))
                    .await
                    .unwrap();

                let mut replacement = record.clone();
                replacement.name = "Replaced".to_string();
                replacement.active = false;
                service.update(&record.id, replacement).await.unwrap();

                let stored = service.get(&record.id).await.unwrap();
                assert_eq!(stored.name, "Replaced");
                assert!(!stored.active);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let service = $factory;
                let record = create_test_record("Ghost", 1.0, true);
                assert!(service.update(&record.id.clone(), record).await.is_err());
            }

            // ==================================================================
            // Remove
            // ==================================================================

            #[tokio::test]
            async fn test_remove_existing() {
                let service = $factory;
                let record = service
                    .create(create_test_record("Doomed", 1.0, true))
                    .await
                    .unwrap();

                let removed = service.remove(&record.id).await.unwrap();
                assert_eq!(removed.id, record.id);
                assert!(service.get(&record.id).await.is_err());
            }

            #[tokio::test]
            async fn test_remove_nonexistent() {
                let service = $factory;
                assert!(service.remove(&Uuid::new_v4()).await.is_err());
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_access() {
                let service = $factory;
                let s1 = service.clone();
                let s2 = service.clone();

                let r1 = create_test_record("Concurrent_A", 1.0, true);
                let r2 = create_test_record("Concurrent_B", 2.0, false);
                let id1 = r1.id;
                let id2 = r2.id;

                let h1 = tokio::spawn(async move { s1.create(r1).await });
                let h2 = tokio::spawn(async move { s2.create(r2).await });
                h1.await.unwrap().unwrap();
                h2.await.unwrap().unwrap();

                assert_eq!(service.get(&id1).await.unwrap().name, "Concurrent_A");
                assert_eq!(service.get(&id2).await.unwrap().name, "Concurrent_B");
                assert_eq!(service.find(&FindQuery::new()).await.unwrap().total, 2);
            }
        }
    };
}
