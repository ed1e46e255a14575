// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query source dispatch
//!
//! Callers may hand the engines a whole model, an already-built query
//! handle, or a registered `(namespace, name)` pair. All three shapes are
//! resolved through one dispatch point into a `(query, model)` pair.

use super::descriptor::ModelDescriptor;
use crate::query::QueryHandle;
use std::sync::Arc;

/// The accepted input shapes for fingerprint engines and cached queries
#[derive(Debug, Clone)]
pub enum QuerySource {
    /// An entire model: resolves to an unfiltered query over its table
    Model(Arc<ModelDescriptor>),
    /// An existing query handle, used as-is
    Query(QueryHandle),
    /// A `(namespace, name)` pair naming a registered model
    Name(String, String),
}

impl QuerySource {
    /// Shorthand for the name-pair variant.
    pub fn name(namespace: &str, name: &str) -> Self {
        QuerySource::Name(namespace.to_string(), name.to_string())
    }
}

impl From<Arc<ModelDescriptor>> for QuerySource {
    fn from(model: Arc<ModelDescriptor>) -> Self {
        QuerySource::Model(model)
    }
}

impl From<QueryHandle> for QuerySource {
    fn from(query: QueryHandle) -> Self {
        QuerySource::Query(query)
    }
}

impl From<(&str, &str)> for QuerySource {
    fn from((namespace, name): (&str, &str)) -> Self {
        QuerySource::name(namespace, name)
    }
}
