//! Test fixture for querycache integration tests
//!
//! Builds an isolated in-memory executor with two registered models (one
//! plain, one carrying an auto-maintained timestamp column) seeded with
//! rows of random content, plus a fresh store per fixture so tests cannot
//! interfere with each other when run in parallel.

use querycache::{
    CacheStore, ColumnDescriptor, MemoryExecutor, MemoryStore, ModelDescriptor, ModelRegistry,
    QueryExecutor, Row, Value,
};
use std::sync::Arc;

pub const NAMESPACE: &str = "tests";
pub const PLAIN_MODEL: &str = "Randomness";
pub const TIMESTAMPED_MODEL: &str = "RandomnessWithLastUpdated";

pub struct TestFixture {
    pub executor: Arc<MemoryExecutor>,
    pub store: Arc<MemoryStore>,
    pub plain: Arc<ModelDescriptor>,
    pub timestamped: Arc<ModelDescriptor>,
}

impl TestFixture {
    /// Fixture with five seeded rows in each model.
    pub fn new() -> Self {
        Self::with_rows(5)
    }

    pub fn with_rows(count: i64) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut registry = ModelRegistry::new();
        let plain = registry.register(ModelDescriptor::new(
            NAMESPACE,
            PLAIN_MODEL,
            "tests_randomness",
            vec![
                ColumnDescriptor::new("id"),
                ColumnDescriptor::new("some_text"),
                ColumnDescriptor::new("category"),
                ColumnDescriptor::new("feature"),
            ],
        ));
        let timestamped = registry.register(ModelDescriptor::new(
            NAMESPACE,
            TIMESTAMPED_MODEL,
            "tests_randomness_last_updated",
            vec![
                ColumnDescriptor::new("id"),
                ColumnDescriptor::new("some_text"),
                ColumnDescriptor::new("category"),
                ColumnDescriptor::new("feature"),
                ColumnDescriptor::auto_now("last_updated"),
            ],
        ));

        let executor = Arc::new(MemoryExecutor::new(registry));
        for id in 1..=count {
            executor.insert(&plain, random_row(id));
            executor.insert(&timestamped, random_row(id));
        }

        Self {
            executor,
            store: Arc::new(MemoryStore::new()),
            plain,
            timestamped,
        }
    }

    /// The executor as the trait object the engines take.
    pub fn executor_dyn(&self) -> Arc<dyn QueryExecutor> {
        self.executor.clone()
    }

    /// The store as the trait object the engines take.
    pub fn store_dyn(&self) -> Arc<dyn CacheStore> {
        self.store.clone()
    }
}

/// A row of random content, so duplicate per-row hashes are implausible.
pub fn random_row(id: i64) -> Row {
    Row::new()
        .with("id", Value::Integer(id))
        .with("some_text", Value::Text(random_token()))
        .with("category", Value::from(random_category()))
        .with("feature", Value::Json(point_geometry(id)))
}

fn random_token() -> String {
    (0..24)
        .map(|_| fastrand::alphanumeric())
        .collect::<String>()
}

fn random_category() -> &'static str {
    ["A", "B", "C", "D", "E"][fastrand::usize(..5)]
}

/// A small GeoJSON point geometry, standing in for a geometry annotation.
pub fn point_geometry(id: i64) -> serde_json::Value {
    serde_json::json!({
        "type": "Point",
        "coordinates": [145.0 + id as f64 * 0.01, -6.0 - id as f64 * 0.01],
    })
}
