// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fingerprint-gated caching
//!
//! This module provides:
//! - Cache key derivation from a query's compiled shape
//! - The fingerprint engines and their staleness decision
//! - The serialized-result cache coordinated by those engines
//! - The key-value store boundary they all write through

pub mod config;
pub mod fingerprint;
pub mod key;
pub mod result_cache;
pub mod store;

pub use config::{
    CachedQueryConfig, FingerprintConfig, DEFAULT_EXPIRY_SECS, DEFAULT_TIMESTAMP_EXPIRY_SECS,
};
pub use fingerprint::{
    ContentFingerprint, Fingerprint, FingerprintRecord, TieredFingerprint, TimestampFingerprint,
};
pub use key::query_to_key;
pub use result_cache::{
    CachedQuery, GeoJsonCachedQuery, GeoJsonSerializer, PlainSerializer, RowSerializer,
};
pub use store::{CacheStore, MemoryStore, NullStore, StoreError};
