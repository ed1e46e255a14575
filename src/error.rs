// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Crate error types

use crate::cache::store::StoreError;
use thiserror::Error;

/// Errors surfaced by fingerprint engines and the result cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not resolve a query or model from input: {0}")]
    Resolution(String),

    #[error("Engine configuration error: {0}")]
    Configuration(String),

    #[error("Cache store error: {0}")]
    Backend(String),

    #[error("Query execution error: {0}")]
    Execution(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<StoreError> for CacheError {
    fn from(error: StoreError) -> Self {
        CacheError::Backend(error.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Serialization(error.to_string())
    }
}
