// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fingerprint engines
//!
//! An engine computes a compact token summarizing a query's current
//! contents and decides, under a wall-clock debounce window, whether the
//! underlying data changed since the last check. Three strategies share the
//! [`Fingerprint`] contract:
//!
//! - [`ContentFingerprint`] XOR-reduces per-row hash tokens. XOR is
//!   commutative and associative, so the aggregate is independent of row
//!   order. Two rows with identical per-row hashes cancel each other out of
//!   the aggregate; that false-negative risk is an accepted tradeoff for
//!   not requiring a stable ordering or per-row salting.
//! - [`TimestampFingerprint`] hashes a `(row_count, max(timestamp))`
//!   aggregate: one round trip instead of a scan.
//! - [`TieredFingerprint`] adds a table-wide aggregate pre-check that
//!   short-circuits the query-scoped check while the table is untouched.

use super::config::{FingerprintConfig, DEFAULT_EXPIRY_SECS, DEFAULT_TIMESTAMP_EXPIRY_SECS};
use super::key::query_to_key;
use super::store::CacheStore;
use crate::error::CacheError;
use crate::exec::QueryExecutor;
use crate::hash::{digest_hex, hex_xor, zero_token, FULL_WIDTH, SHORT_WIDTH};
use crate::model::{ModelDescriptor, QuerySource};
use crate::query::{QueryHandle, RowHashExpr};
use crate::value::Value;
use chrono::{SecondsFormat, Utc};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

/// Column name under which the per-row hash annotation is evaluated
const ANNOTATION: &str = "fingerprint";

/// The staleness-decision contract shared by all engines
pub trait Fingerprint: Send + Sync {
    /// Compute the current fingerprint token from the database.
    fn query_fingerprint(&self) -> Result<String, CacheError>;

    /// Decide whether cached data derived from this query is stale.
    ///
    /// A cached fingerprint younger than the expiry window short-circuits
    /// to `false` without touching the database unless `force_check` is
    /// set. Otherwise the fingerprint is recomputed and compared; every
    /// non-short-circuited call rewrites the freshness stamp, so the
    /// window debounces rather than latching once.
    fn update_required(&self, force_check: bool) -> Result<bool, CacheError>;

    /// Remove the cached fingerprint and its freshness stamp together.
    fn clear_cached_fingerprint(&self) -> Result<(), CacheError>;

    fn cache_key(&self) -> &str;

    fn time_cache_key(&self) -> &str;
}

/// A cached token and the wall-clock second it was computed.
///
/// The token and stamp are written and cleared only through this struct,
/// which is what keeps the "no fingerprint without a freshness stamp"
/// invariant out of convention and in one code path.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintRecord {
    pub token: String,
    pub computed_at: Option<f64>,
}

impl FingerprintRecord {
    pub fn load(
        store: &dyn CacheStore,
        cache_key: &str,
        time_cache_key: &str,
    ) -> Result<Option<Self>, CacheError> {
        let token = match store.get(cache_key)? {
            Some(token) => token,
            None => return Ok(None),
        };
        let computed_at = store
            .get(time_cache_key)?
            .and_then(|raw| raw.parse::<f64>().ok());
        Ok(Some(Self { token, computed_at }))
    }

    /// Write the stamp and the token in one logical operation.
    pub fn store(
        store: &dyn CacheStore,
        cache_key: &str,
        time_cache_key: &str,
        token: &str,
    ) -> Result<(), CacheError> {
        let now = Utc::now().timestamp_micros() as f64 / 1e6;
        store.set(time_cache_key, &now.to_string())?;
        store.set(cache_key, token)?;
        Ok(())
    }

    /// Delete the token and the stamp in one logical operation.
    pub fn clear(
        store: &dyn CacheStore,
        cache_key: &str,
        time_cache_key: &str,
    ) -> Result<(), CacheError> {
        store.delete(time_cache_key)?;
        store.delete(cache_key)?;
        Ok(())
    }

    /// Seconds elapsed since the stamp, if one was recorded.
    pub fn age_secs(&self) -> Option<f64> {
        let stamp = self.computed_at?;
        Some(Utc::now().timestamp_micros() as f64 / 1e6 - stamp)
    }
}

/// State shared by every engine: the resolved query, the store handles and
/// the debounce window.
pub(crate) struct FingerprintCore {
    executor: Arc<dyn QueryExecutor>,
    store: Arc<dyn CacheStore>,
    query: QueryHandle,
    model: Arc<ModelDescriptor>,
    cache_key: String,
    time_cache_key: String,
    expiry_secs: f64,
    long_hash: bool,
}

impl FingerprintCore {
    fn new(
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn CacheStore>,
        source: QuerySource,
        config: &FingerprintConfig,
        default_expiry: f64,
    ) -> Result<Self, CacheError> {
        let (query, model) = executor.resolve(&source)?;

        let cache_key = config
            .cache_key
            .clone()
            .unwrap_or_else(|| query_to_key(&query, "_hash"));
        let time_cache_key = config
            .time_cache_key
            .clone()
            .unwrap_or_else(|| format!("{cache_key}_set_time"));
        let expiry_secs = config.fingerprint_expiry.unwrap_or(default_expiry);

        Ok(Self {
            executor,
            store,
            query,
            model,
            cache_key,
            time_cache_key,
            expiry_secs,
            long_hash: config.long_hash,
        })
    }

    fn width(&self) -> usize {
        if self.long_hash {
            FULL_WIDTH
        } else {
            SHORT_WIDTH
        }
    }

    fn cached_record(&self) -> Result<Option<FingerprintRecord>, CacheError> {
        FingerprintRecord::load(&*self.store, &self.cache_key, &self.time_cache_key)
    }

    fn store_token(&self, token: &str) -> Result<(), CacheError> {
        FingerprintRecord::store(&*self.store, &self.cache_key, &self.time_cache_key, token)
    }

    fn clear(&self) -> Result<(), CacheError> {
        FingerprintRecord::clear(&*self.store, &self.cache_key, &self.time_cache_key)
    }

    /// Time-based expiration of the cached fingerprint. Keeps repeated
    /// staleness checks from spamming the fingerprint query.
    fn expired(&self) -> Result<bool, CacheError> {
        let record = match self.cached_record()? {
            Some(record) => record,
            None => {
                debug!("Hash is not in the cache");
                return Ok(true);
            }
        };
        let age = match record.age_secs() {
            Some(age) => age,
            None => {
                debug!("Unknown hash date");
                return Ok(true);
            }
        };
        if age < self.expiry_secs {
            debug!(
                "Fresh fingerprint: {:.1} seconds, expiring at {} seconds",
                age, self.expiry_secs
            );
            return Ok(false);
        }
        debug!("Old fingerprint: {:.1} seconds", age);
        Ok(true)
    }

    /// The shared staleness decision. `fresh` is only invoked once the
    /// debounce window has been passed (or bypassed).
    fn decide<F>(&self, force_check: bool, fresh: F) -> Result<bool, CacheError>
    where
        F: FnOnce() -> Result<String, CacheError>,
    {
        if !self.expired()? && !force_check {
            return Ok(false);
        }

        let current = self.cached_record()?.map(|record| record.token);
        let new_fp = fresh()?;
        if current.as_deref() == Some(new_fp.as_str()) {
            // Still rewrite the record so the freshness stamp advances
            self.store_token(&new_fp)?;
            debug!("Fingerprint has not changed");
            return Ok(false);
        }
        debug!(
            "Refreshing fingerprint for {} from {:?} to {}",
            self.cache_key, current, new_fp
        );
        self.store_token(&new_fp)?;
        Ok(true)
    }
}

/// Content-hash engine: XOR reduction of per-row hash tokens
pub struct ContentFingerprint {
    core: FingerprintCore,
    hash_expr: RowHashExpr,
}

impl ContentFingerprint {
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn CacheStore>,
        source: impl Into<QuerySource>,
        config: FingerprintConfig,
    ) -> Result<Self, CacheError> {
        let hash_expr = RowHashExpr::for_fields(&config.hash_fields, config.long_hash);
        let core = FingerprintCore::new(
            executor,
            store,
            source.into(),
            &config,
            DEFAULT_EXPIRY_SECS,
        )?;
        Ok(Self { core, hash_expr })
    }

    /// The row hash expression this engine annotates queries with.
    pub fn hash_expr(&self) -> &RowHashExpr {
        &self.hash_expr
    }
}

impl Fingerprint for ContentFingerprint {
    fn query_fingerprint(&self) -> Result<String, CacheError> {
        let started = Instant::now();
        let annotated = self
            .core
            .query
            .clone()
            .annotate(ANNOTATION, self.hash_expr.clone());
        let rows = self.core.executor.rows(&annotated)?;

        let width = self.core.width();
        let mut aggregate = zero_token(width);
        for row in &rows {
            let token = match row.get(ANNOTATION) {
                Some(Value::Text(token)) => token.as_str(),
                _ => {
                    return Err(CacheError::Execution(format!(
                        "Executor returned no '{ANNOTATION}' annotation for table '{}'",
                        self.core.model.table
                    )))
                }
            };
            aggregate = hex_xor(&aggregate, token);
        }
        debug!(
            "Content fingerprint over {} rows took {:.1} ms",
            rows.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(aggregate)
    }

    fn update_required(&self, force_check: bool) -> Result<bool, CacheError> {
        self.core.decide(force_check, || self.query_fingerprint())
    }

    fn clear_cached_fingerprint(&self) -> Result<(), CacheError> {
        self.core.clear()
    }

    fn cache_key(&self) -> &str {
        &self.core.cache_key
    }

    fn time_cache_key(&self) -> &str {
        &self.core.time_cache_key
    }
}

/// Format the aggregate composite and digest it to the configured width.
fn aggregate_token(row_count: u64, newest: Option<chrono::DateTime<Utc>>, width: usize) -> String {
    // An empty row set has no max timestamp; substitute the current wall
    // clock so the composite is always hashable. An empty set therefore
    // never reports "unchanged" on a non-debounced check.
    let newest_text = newest
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::AutoSi, true);
    digest_hex(&format!("{row_count}{newest_text}"), width)
}

/// Timestamp engine: hashes `(row_count, max(timestamp_column))`
pub struct TimestampFingerprint {
    core: FingerprintCore,
    timestamp_column: String,
}

impl TimestampFingerprint {
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn CacheStore>,
        source: impl Into<QuerySource>,
        config: FingerprintConfig,
    ) -> Result<Self, CacheError> {
        let mut core = FingerprintCore::new(
            executor,
            store,
            source.into(),
            &config,
            DEFAULT_TIMESTAMP_EXPIRY_SECS,
        )?;

        // Separate key space from the content engine for the same query
        core.cache_key.push_str("_ts");
        core.time_cache_key.push_str("_ts");

        let timestamp_column = match config.timestamp_column {
            Some(column) => column,
            None => core
                .model
                .auto_now_column()
                .map(|c| c.to_string())
                .ok_or_else(|| {
                    CacheError::Configuration(format!(
                        "No timestamp column on model {}.{}",
                        core.model.namespace, core.model.name
                    ))
                })?,
        };
        debug!("Using {timestamp_column} as timestamp column");

        Ok(Self {
            core,
            timestamp_column,
        })
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }
}

impl Fingerprint for TimestampFingerprint {
    fn query_fingerprint(&self) -> Result<String, CacheError> {
        let aggregate = self
            .core
            .executor
            .aggregate(&self.core.query, &self.timestamp_column)?;
        Ok(aggregate_token(
            aggregate.row_count,
            aggregate.newest,
            self.core.width(),
        ))
    }

    fn update_required(&self, force_check: bool) -> Result<bool, CacheError> {
        self.core.decide(force_check, || self.query_fingerprint())
    }

    fn clear_cached_fingerprint(&self) -> Result<(), CacheError> {
        self.core.clear()
    }

    fn cache_key(&self) -> &str {
        &self.core.cache_key
    }

    fn time_cache_key(&self) -> &str {
        &self.core.time_cache_key
    }
}

/// Tiered engine: a table-wide aggregate pre-check in front of the
/// query-scoped timestamp check.
///
/// The table check ignores the query's filters, so it is one cheap extra
/// round trip; while the table is untouched between polls it saves the
/// potentially filtered/joined query-scoped aggregate entirely. The table
/// fingerprint is recomputed on every call; the debounce window only
/// applies to the query-scoped stage it guards.
pub struct TieredFingerprint {
    inner: TimestampFingerprint,
    table_cache_key: String,
    table_time_cache_key: String,
}

impl TieredFingerprint {
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn CacheStore>,
        source: impl Into<QuerySource>,
        config: FingerprintConfig,
    ) -> Result<Self, CacheError> {
        let inner = TimestampFingerprint::new(executor, store, source, config)?;
        let table_cache_key = format!("{}_table", inner.core.cache_key);
        let table_time_cache_key = format!("{}_table", inner.core.time_cache_key);
        Ok(Self {
            inner,
            table_cache_key,
            table_time_cache_key,
        })
    }

    pub fn table_cache_key(&self) -> &str {
        &self.table_cache_key
    }

    /// The `(row_count, max(timestamp))` token for the whole table,
    /// ignoring the query's filters.
    fn table_fingerprint(&self) -> Result<String, CacheError> {
        let table_query = QueryHandle::all(self.inner.core.model.clone());
        let aggregate = self
            .inner
            .core
            .executor
            .aggregate(&table_query, &self.inner.timestamp_column)?;
        Ok(aggregate_token(
            aggregate.row_count,
            aggregate.newest,
            self.inner.core.width(),
        ))
    }

    fn cached_table_record(&self) -> Result<Option<FingerprintRecord>, CacheError> {
        FingerprintRecord::load(
            &*self.inner.core.store,
            &self.table_cache_key,
            &self.table_time_cache_key,
        )
    }

    fn store_table_token(&self, token: &str) -> Result<(), CacheError> {
        FingerprintRecord::store(
            &*self.inner.core.store,
            &self.table_cache_key,
            &self.table_time_cache_key,
            token,
        )
    }
}

impl Fingerprint for TieredFingerprint {
    fn query_fingerprint(&self) -> Result<String, CacheError> {
        self.inner.query_fingerprint()
    }

    fn update_required(&self, force_check: bool) -> Result<bool, CacheError> {
        let table_fp = self.table_fingerprint()?;
        let cached = self.cached_table_record()?.map(|record| record.token);
        if cached.as_deref() == Some(table_fp.as_str()) {
            self.store_table_token(&table_fp)?;
            debug!("Table not updated");
            return Ok(false);
        }
        self.store_table_token(&table_fp)?;
        debug!("Table may have changed. Now checking if query has changed");
        self.inner.update_required(force_check)
    }

    fn clear_cached_fingerprint(&self) -> Result<(), CacheError> {
        FingerprintRecord::clear(
            &*self.inner.core.store,
            &self.table_cache_key,
            &self.table_time_cache_key,
        )?;
        self.inner.clear_cached_fingerprint()
    }

    fn cache_key(&self) -> &str {
        self.inner.cache_key()
    }

    fn time_cache_key(&self) -> &str {
        self.inner.time_cache_key()
    }
}
