//! Timestamp and tiered fingerprint engine tests
//!
//! The auto-maintained column is discovered from the model descriptor, a
//! single aggregate replaces the per-row scan, and the tiered engine
//! short-circuits on an untouched table.

#[path = "testutils/mod.rs"]
mod testutils;

use querycache::{
    CacheError, Fingerprint, FingerprintConfig, QuerySource, TieredFingerprint,
    TimestampFingerprint, Value,
};
use std::time::Duration;
use testutils::{TestFixture, NAMESPACE, TIMESTAMPED_MODEL};

fn eager_config() -> FingerprintConfig {
    // A negative window means every check recomputes
    FingerprintConfig::default().with_expiry(-1.0)
}

#[test]
fn timestamp_column_is_discovered_from_the_descriptor() {
    let fixture = TestFixture::new();
    let engine = TimestampFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        QuerySource::name(NAMESPACE, TIMESTAMPED_MODEL),
        FingerprintConfig::default(),
    )
    .unwrap();
    assert_eq!(engine.timestamp_column(), "last_updated");
}

#[test]
fn explicit_timestamp_column_wins_over_discovery() {
    let fixture = TestFixture::new();
    let engine = TimestampFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        fixture.timestamped.clone(),
        FingerprintConfig::default().with_timestamp_column("last_updated"),
    )
    .unwrap();
    assert_eq!(engine.timestamp_column(), "last_updated");
}

#[test]
fn construction_fails_for_a_model_without_a_timestamp_column() {
    let fixture = TestFixture::new();
    let result = TimestampFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        fixture.plain.clone(),
        FingerprintConfig::default(),
    );
    assert!(matches!(result, Err(CacheError::Configuration(_))));
    // Construction failed before anything touched the store
    assert!(fixture.store.is_empty());
}

#[test]
fn update_required_detects_a_touched_row() {
    let fixture = TestFixture::new();
    let engine = TimestampFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        fixture.timestamped.clone(),
        eager_config(),
    )
    .unwrap();

    assert!(engine.update_required(false).unwrap());
    assert!(!engine.update_required(false).unwrap());

    // Re-saving a row advances its auto-now stamp
    std::thread::sleep(Duration::from_millis(5));
    fixture
        .executor
        .touch_where(&fixture.timestamped, "id", &Value::Integer(5));
    assert!(engine.update_required(false).unwrap());
    assert!(!engine.update_required(false).unwrap());
}

#[test]
fn update_required_detects_a_deleted_row() {
    let fixture = TestFixture::new();
    let engine = TimestampFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        fixture.timestamped.clone(),
        eager_config(),
    )
    .unwrap();

    assert!(engine.update_required(false).unwrap());
    assert!(!engine.update_required(false).unwrap());

    let removed = fixture
        .executor
        .delete_where(&fixture.timestamped, "id", &Value::Integer(1));
    assert_eq!(removed, 1);
    assert!(engine.update_required(false).unwrap());
}

#[test]
fn timestamp_keys_are_separated_from_content_keys() {
    let fixture = TestFixture::new();
    let engine = TimestampFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        fixture.timestamped.clone(),
        FingerprintConfig::default(),
    )
    .unwrap();
    assert!(engine.cache_key().ends_with("_ts"));
    assert!(engine.time_cache_key().ends_with("_ts"));
}

#[test]
fn tiered_check_short_circuits_on_an_untouched_table() {
    let fixture = TestFixture::new();
    let engine = TieredFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        fixture.timestamped.clone(),
        eager_config(),
    )
    .unwrap();

    assert!(engine.update_required(false).unwrap());

    // With the table untouched, only the table-wide aggregate runs
    let before = fixture.executor.execution_count();
    assert!(!engine.update_required(false).unwrap());
    assert_eq!(fixture.executor.execution_count(), before + 1);

    // A touched table falls through to the query-scoped check
    std::thread::sleep(Duration::from_millis(5));
    fixture
        .executor
        .touch_where(&fixture.timestamped, "id", &Value::Integer(2));
    let before = fixture.executor.execution_count();
    assert!(engine.update_required(false).unwrap());
    assert_eq!(fixture.executor.execution_count(), before + 2);
}

#[test]
fn tiered_table_keys_are_distinct_from_query_keys() {
    let fixture = TestFixture::new();
    let engine = TieredFingerprint::new(
        fixture.executor_dyn(),
        fixture.store_dyn(),
        fixture.timestamped.clone(),
        FingerprintConfig::default(),
    )
    .unwrap();
    assert_ne!(engine.table_cache_key(), engine.cache_key());
    assert!(engine.table_cache_key().ends_with("_table"));
}
