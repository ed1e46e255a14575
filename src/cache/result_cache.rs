// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Serialized result caching
//!
//! [`CachedQuery`] pairs a fingerprint engine with the value store: the
//! serialized rows are recomputed only when the engine reports a change,
//! so repeated fetches of an unchanged result set cost one store read.

use super::config::{CachedQueryConfig, FingerprintConfig};
use super::fingerprint::{ContentFingerprint, Fingerprint, TimestampFingerprint};
use super::key::query_to_key;
use super::store::CacheStore;
use crate::error::CacheError;
use crate::exec::{QueryExecutor, Row};
use crate::model::{ModelDescriptor, QuerySource};
use crate::query::QueryHandle;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Converts result rows to the cached JSON shape
pub trait RowSerializer: Send + Sync {
    fn serialize(
        &self,
        rows: &[Row],
        query: &QueryHandle,
    ) -> Result<serde_json::Value, CacheError>;
}

/// Default serializer: each row becomes a column-name → value mapping
pub struct PlainSerializer;

impl RowSerializer for PlainSerializer {
    fn serialize(
        &self,
        rows: &[Row],
        query: &QueryHandle,
    ) -> Result<serde_json::Value, CacheError> {
        let columns = query.output_columns();
        let serialized: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                let mut object = serde_json::Map::new();
                for column in &columns {
                    let value = row
                        .get(column)
                        .map(|v| v.to_json())
                        .unwrap_or(serde_json::Value::Null);
                    object.insert(column.clone(), value);
                }
                serde_json::Value::Object(object)
            })
            .collect();
        Ok(serde_json::Value::Array(serialized))
    }
}

/// Reshapes rows into GeoJSON `Feature` objects: one annotated geometry
/// column plus a chosen set of property columns.
pub struct GeoJsonSerializer {
    pub geometry_field: String,
    pub properties: Vec<String>,
}

impl RowSerializer for GeoJsonSerializer {
    fn serialize(
        &self,
        rows: &[Row],
        _query: &QueryHandle,
    ) -> Result<serde_json::Value, CacheError> {
        let features: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                let geometry = row
                    .get(&self.geometry_field)
                    .map(|v| v.to_json())
                    .unwrap_or(serde_json::Value::Null);
                let mut properties = serde_json::Map::new();
                for field in &self.properties {
                    let value = row
                        .get(field)
                        .map(|v| v.to_json())
                        .unwrap_or(serde_json::Value::Null);
                    properties.insert(field.clone(), value);
                }
                serde_json::json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": properties,
                })
            })
            .collect();
        Ok(serde_json::Value::Array(features))
    }
}

/// Cache of a query's serialized results, refreshed only on fingerprint
/// change.
///
/// Against a no-op store every fetch recomputes the serialization straight
/// from the query: correct (never stale), just without the caching win.
pub struct CachedQuery {
    executor: Arc<dyn QueryExecutor>,
    store: Arc<dyn CacheStore>,
    query: QueryHandle,
    model: Arc<ModelDescriptor>,
    cache_key: String,
    engine: Box<dyn Fingerprint>,
    serializer: Box<dyn RowSerializer>,
}

impl CachedQuery {
    /// Build a cached query with the default engine selection: the
    /// timestamp engine when the model carries an auto-maintained column,
    /// otherwise the content-hash engine.
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn CacheStore>,
        source: impl Into<QuerySource>,
        config: CachedQueryConfig,
    ) -> Result<Self, CacheError> {
        let (query, model) = executor.resolve(&source.into())?;
        let query = if config.query_values.is_empty() {
            query
        } else {
            let columns: Vec<&str> = config.query_values.iter().map(|v| v.as_str()).collect();
            query.project(&columns)
        };

        let cache_key = config
            .cache_key
            .clone()
            .unwrap_or_else(|| query_to_key(&query, ""));

        let engine_config = FingerprintConfig {
            fingerprint_expiry: config.fingerprint_expiry,
            ..FingerprintConfig::default()
        };
        let engine: Box<dyn Fingerprint> = match TimestampFingerprint::new(
            executor.clone(),
            store.clone(),
            query.clone(),
            engine_config.clone(),
        ) {
            Ok(engine) => Box::new(engine),
            Err(CacheError::Configuration(_)) => Box::new(ContentFingerprint::new(
                executor.clone(),
                store.clone(),
                query.clone(),
                engine_config,
            )?),
            Err(other) => return Err(other),
        };

        Ok(Self {
            executor,
            store,
            query,
            model,
            cache_key,
            engine,
            serializer: Box::new(PlainSerializer),
        })
    }

    /// Swap in a caller-supplied fingerprint engine.
    pub fn with_engine(mut self, engine: Box<dyn Fingerprint>) -> Self {
        self.engine = engine;
        self
    }

    /// Swap in a caller-supplied serializer.
    pub fn with_serializer(mut self, serializer: Box<dyn RowSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn model(&self) -> &Arc<ModelDescriptor> {
        &self.model
    }

    pub fn engine(&self) -> &dyn Fingerprint {
        self.engine.as_ref()
    }

    /// Return the cached serialization, refreshing it first if the
    /// fingerprint engine reports a change.
    pub fn get_with_update(&self) -> Result<serde_json::Value, CacheError> {
        let started = Instant::now();
        self.update_if_required()?;
        let value = self.cached_query()?;
        debug!(
            "get_with_update for {} took {:.1} ms",
            self.cache_key,
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(value)
    }

    /// Check freshness and refresh the stored serialization when needed.
    pub fn update_if_required(&self) -> Result<(), CacheError> {
        if !self.store.contains(&self.cache_key)? {
            self.update_cache()?;
            info!("No data in cache, updating");
            // Prime the fingerprint so the next call has a baseline
            self.engine.update_required(false)?;
        } else if self.engine.update_required(false)? {
            self.update_cache()?;
            info!("Fingerprinting showed database changes, updated");
        } else {
            info!("Fingerprint was recent or unchanged");
        }
        Ok(())
    }

    /// Serialize the query and store the result.
    pub fn update_cache(&self) -> Result<(), CacheError> {
        if self.store.is_noop() {
            return Ok(());
        }
        let serialized = self.serialized_query()?;
        debug!("Refreshing cache for {}", self.cache_key);
        self.store.set(&self.cache_key, &serialized.to_string())?;
        Ok(())
    }

    fn cached_query(&self) -> Result<serde_json::Value, CacheError> {
        if self.store.is_noop() {
            return self.serialized_query();
        }
        match self.store.get(&self.cache_key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => self.serialized_query(),
        }
    }

    /// Serialize the query's current rows directly from the executor.
    pub fn serialized_query(&self) -> Result<serde_json::Value, CacheError> {
        let rows = self.executor.rows(&self.query)?;
        self.serializer.serialize(&rows, &self.query)
    }
}

/// A [`CachedQuery`] that serializes rows as GeoJSON features.
///
/// The geometry field should hold a GeoJSON annotation rather than a raw
/// geometry column.
pub struct GeoJsonCachedQuery {
    inner: CachedQuery,
}

impl GeoJsonCachedQuery {
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn CacheStore>,
        source: impl Into<QuerySource>,
        config: CachedQueryConfig,
        geometry_field: &str,
        properties: &[&str],
    ) -> Result<Self, CacheError> {
        let serializer = GeoJsonSerializer {
            geometry_field: geometry_field.to_string(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        };
        let inner =
            CachedQuery::new(executor, store, source, config)?.with_serializer(Box::new(serializer));
        Ok(Self { inner })
    }

    pub fn cache_key(&self) -> &str {
        self.inner.cache_key()
    }

    /// Update the cached features if necessary and return them.
    pub fn features(&self) -> Result<serde_json::Value, CacheError> {
        self.inner.get_with_update()
    }

    pub fn get_with_update(&self) -> Result<serde_json::Value, CacheError> {
        self.inner.get_with_update()
    }
}
