// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result rows

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single result row: named column bindings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn from_values(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    /// Builder-style insertion, convenient when seeding tables.
    pub fn with(mut self, column: &str, value: Value) -> Self {
        self.set(column, value);
        self
    }

    /// The row restricted to the given columns. Missing columns come back
    /// as nulls rather than being dropped, so projections keep their shape.
    pub fn project(&self, columns: &[String]) -> Row {
        let mut values = HashMap::new();
        for column in columns {
            let value = self.get(column).cloned().unwrap_or(Value::Null);
            values.insert(column.clone(), value);
        }
        Row { values }
    }
}
