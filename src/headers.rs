// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! HTTP conditional-request header values
//!
//! Produces `ETag` and `Last-Modified` values for a query's current
//! contents and evaluates `If-None-Match`. No web framework is pulled in;
//! callers place the strings into whatever response type they use.

use crate::cache::{CacheStore, ContentFingerprint, Fingerprint, FingerprintConfig};
use crate::error::CacheError;
use crate::exec::QueryExecutor;
use crate::model::QuerySource;
use crate::query::OrderDirection;
use std::sync::Arc;

/// `Last-Modified` header format per RFC 7231
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// The latest auto-maintained timestamp of the query's rows, formatted for
/// a `Last-Modified` header. `None` when the model has no auto-maintained
/// column or the row set is empty.
pub fn last_modified_header(
    executor: Arc<dyn QueryExecutor>,
    source: impl Into<QuerySource>,
) -> Result<Option<String>, CacheError> {
    let (query, model) = executor.resolve(&source.into())?;
    let column = match model.auto_now_column() {
        Some(column) => column.to_string(),
        None => return Ok(None),
    };

    let newest = executor
        .rows(
            &query
                .order_by(&column, OrderDirection::Desc)
                .project(&[column.as_str()])
                .limit(1),
        )?
        .first()
        .and_then(|row| row.get(&column).and_then(|v| v.as_datetime()));

    Ok(newest.map(|dt| dt.format(HTTP_DATE_FORMAT).to_string()))
}

/// The content fingerprint of the query's current rows, suitable for an
/// `ETag` value. `hash_fields` narrows the hash to the serializer's field
/// subset; empty means the whole row.
pub fn etag_header(
    executor: Arc<dyn QueryExecutor>,
    store: Arc<dyn CacheStore>,
    source: impl Into<QuerySource>,
    hash_fields: &[&str],
) -> Result<String, CacheError> {
    let config = FingerprintConfig::default().with_hash_fields(hash_fields);
    ContentFingerprint::new(executor, store, source, config)?.query_fingerprint()
}

/// Evaluate `If-None-Match` against the current ETag: true means the
/// caller should answer with `304 Not Modified`.
pub fn not_modified(if_none_match: Option<&str>, etag: &str) -> bool {
    match if_none_match {
        Some(candidate) => candidate == etag,
        None => false,
    }
}
