//! Shared test harness for storage backend testing
//!
//! Provides `TestRecord`, a small document with a schema bound, and helper
//! functions for creating test data.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
mod data_service_tests;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ---------------------------------------------------------------------------
// TestRecord
// ---------------------------------------------------------------------------

/// A test document.
///
/// `score` is bounded to `[0, 100]` so schema violations can be provoked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub score: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct TestRecordPatch {
    pub name: Option<String>,
    pub score: Option<f64>,
    pub active: Option<bool>,
}

desk::impl_document!(TestRecord, "test_record", "test_records", TestRecordPatch);

desk::impl_patch!(TestRecordPatch => TestRecord { name, score, active });

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Create a `TestRecord` with a random ID, timestamps set to now.
pub fn create_test_record(name: &str, score: f64, active: bool) -> TestRecord {
    let now = Utc::now();
    TestRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        score,
        active,
        created_at: now,
        updated_at: now,
    }
}

/// Generate `n` records created one second apart, oldest first.
///
/// Scores run 90, 80, 70, ... so score order is the reverse of creation order.
pub fn sample_batch(n: usize) -> Vec<TestRecord> {
    let base = Utc::now();
    (0..n)
        .map(|i| {
            let mut record = create_test_record(
                &format!("Record_{}", i),
                90.0 - (i as f64 * 10.0) % 90.0,
                i % 2 == 0,
            );
            record.created_at = base + Duration::seconds(i as i64);
            record.updated_at = record.created_at;
            record
        })
        .collect()
}

/// Assert that a list contains exactly `n` documents.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} documents, got {}",
        expected,
        list.len()
    );
}
