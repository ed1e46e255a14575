// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! querycache - Deterministic query-result fingerprinting and caching
//!
//! The crate computes compact, order-independent fingerprints of a query's
//! current contents, decides staleness under a wall-clock debounce window,
//! and coordinates that decision with an injected key-value store so cached
//! serializations are refreshed only when the data actually changed.
//!
//! # Features
//!
//! - **Content fingerprints**: XOR-reduced per-row hash tokens, stable
//!   under row reordering and pagination
//! - **Timestamp fingerprints**: a single `(count, max(timestamp))`
//!   aggregate where the model carries an auto-maintained column
//! - **Tiered checks**: a table-wide pre-check that short-circuits the
//!   query-scoped check while the table is untouched
//! - **Result caching**: serialized rows refreshed only on fingerprint
//!   change, with a detectable no-op store for cacheless environments
//! - **Conditional requests**: `ETag` / `Last-Modified` header values
//!
//! # Usage
//!
//! ```text
//! let engine = TimestampFingerprint::new(executor, store, model, config)?;
//! if engine.update_required(false)? {
//!     // data changed since the last check
//! }
//!
//! let cached = CachedQuery::new(executor, store, model, config)?;
//! let rows = cached.get_with_update()?;
//! ```

pub mod cache;
pub mod error;
pub mod exec;
pub mod hash;
pub mod headers;
pub mod model;
pub mod query;
pub mod value;

// Re-export the primary API surface
pub use cache::{
    CacheStore, CachedQuery, CachedQueryConfig, ContentFingerprint, Fingerprint,
    FingerprintConfig, FingerprintRecord, GeoJsonCachedQuery, MemoryStore, NullStore,
    TieredFingerprint, TimestampFingerprint,
};
pub use error::CacheError;
pub use exec::{MemoryExecutor, QueryExecutor, Row, TableAggregate};
pub use model::{ColumnDescriptor, ModelDescriptor, ModelRegistry, QuerySource};
pub use query::{FilterOp, OrderDirection, QueryHandle, RowHashExpr};
pub use value::Value;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
