// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Engine and result-cache configuration

use serde::{Deserialize, Serialize};

/// Default debounce window for the content-hash engine, in seconds
pub const DEFAULT_EXPIRY_SECS: f64 = 30.0;

/// Default debounce window for the timestamp engines. Timestamp checks are
/// a single cheap aggregate, so near-zero caching minimizes staleness.
pub const DEFAULT_TIMESTAMP_EXPIRY_SECS: f64 = 0.1;

/// Configuration for a fingerprint engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Override the derived fingerprint cache key
    pub cache_key: Option<String>,

    /// Override the derived freshness-stamp key
    pub time_cache_key: Option<String>,

    /// Columns used for the per-row hash; empty means the whole row
    pub hash_fields: Vec<String>,

    /// Seconds a cached fingerprint is trusted without re-querying.
    /// `None` selects the engine's default window.
    pub fingerprint_expiry: Option<f64>,

    /// Emit 32 character (128-bit) tokens instead of 8 character ones
    pub long_hash: bool,

    /// Timestamp column for the timestamp engines; `None` means discover
    /// the model's auto-maintained column
    pub timestamp_column: Option<String>,
}

impl FingerprintConfig {
    pub fn with_expiry(mut self, seconds: f64) -> Self {
        self.fingerprint_expiry = Some(seconds);
        self
    }

    pub fn with_hash_fields(mut self, fields: &[&str]) -> Self {
        self.hash_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_long_hash(mut self) -> Self {
        self.long_hash = true;
        self
    }

    pub fn with_timestamp_column(mut self, column: &str) -> Self {
        self.timestamp_column = Some(column.to_string());
        self
    }
}

/// Configuration for [`CachedQuery`](crate::cache::CachedQuery)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachedQueryConfig {
    /// Override the derived value cache key
    pub cache_key: Option<String>,

    /// Columns to serialize; empty means every model column
    pub query_values: Vec<String>,

    /// Debounce window handed through to the fingerprint engine
    pub fingerprint_expiry: Option<f64>,
}

impl CachedQueryConfig {
    pub fn with_query_values(mut self, values: &[&str]) -> Self {
        self.query_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_expiry(mut self, seconds: f64) -> Self {
        self.fingerprint_expiry = Some(seconds);
        self
    }
}
