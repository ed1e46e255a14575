// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Model registry
//!
//! Central lookup from `(namespace, name)` identifiers to registered model
//! descriptors. Registration is explicit; nothing is discovered by probing.

use super::descriptor::ModelDescriptor;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of model descriptors keyed by `(namespace, name)`
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<(String, String), Arc<ModelDescriptor>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Register a model descriptor, returning the shared handle.
    pub fn register(&mut self, model: ModelDescriptor) -> Arc<ModelDescriptor> {
        let key = (model.namespace.clone(), model.name.clone());
        let model = Arc::new(model);
        self.models.insert(key, model.clone());
        log::info!("Registered model: {}.{}", model.namespace, model.name);
        model
    }

    /// Look up a model by its `(namespace, name)` pair.
    pub fn get(&self, namespace: &str, name: &str) -> Option<Arc<ModelDescriptor>> {
        self.models
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
