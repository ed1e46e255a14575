// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Table and column descriptors

use serde::{Deserialize, Serialize};

/// A single column on a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// True when the column is rewritten with the current timestamp on
    /// every save. Set at registration time; engines never probe for it.
    pub auto_now: bool,
}

impl ColumnDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            auto_now: false,
        }
    }

    /// Mark this column as auto-maintained on write.
    pub fn auto_now(name: &str) -> Self {
        Self {
            name: name.to_string(),
            auto_now: true,
        }
    }
}

/// Describes one registered model: its namespace, name, backing table and
/// column set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub namespace: String,
    pub name: String,
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl ModelDescriptor {
    pub fn new(namespace: &str, name: &str, table: &str, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            table: table.to_string(),
            columns,
        }
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The first column flagged as auto-maintained on write, if any.
    pub fn auto_now_column(&self) -> Option<&str> {
        let found = self
            .columns
            .iter()
            .find(|c| c.auto_now)
            .map(|c| c.name.as_str());
        if found.is_none() {
            log::warn!(
                "No timestamp column in: {:?}",
                self.column_names()
            );
        }
        found
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}
