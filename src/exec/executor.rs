// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Executor trait

use super::row::Row;
use crate::error::CacheError;
use crate::model::{ModelDescriptor, QuerySource};
use crate::query::QueryHandle;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of the `(row_count, max(timestamp_column))` aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct TableAggregate {
    pub row_count: u64,
    /// Newest value of the timestamp column; `None` for an empty row set
    pub newest: Option<DateTime<Utc>>,
}

/// The query execution boundary.
///
/// Implementations block until the underlying store responds; the engines
/// impose no timeouts or retries of their own. Failures must propagate:
/// mapping an executor error to "not stale" would mask real
/// data-visibility problems.
pub trait QueryExecutor: Send + Sync {
    /// Resolve any accepted input shape to a `(query, model)` pair.
    ///
    /// Fails with [`CacheError::Resolution`] when the identifier does not
    /// name anything this executor knows about.
    fn resolve(
        &self,
        source: &QuerySource,
    ) -> Result<(QueryHandle, Arc<ModelDescriptor>), CacheError>;

    /// Execute the handle and return its rows, with any annotation
    /// evaluated into the annotated column.
    fn rows(&self, query: &QueryHandle) -> Result<Vec<Row>, CacheError>;

    /// One aggregate round trip over the handle's row set:
    /// `(row_count, max(timestamp_column))`.
    fn aggregate(
        &self,
        query: &QueryHandle,
        timestamp_column: &str,
    ) -> Result<TableAggregate, CacheError>;
}
