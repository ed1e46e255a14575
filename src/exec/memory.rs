// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory query executor
//!
//! Tables live in a `RwLock`-guarded map keyed by table name. Writes stamp
//! auto-maintained timestamp columns, mirroring what a database trigger or
//! ORM save hook would do, so the timestamp engines behave the same against
//! this executor as against a real store.

use super::executor::{QueryExecutor, TableAggregate};
use super::row::Row;
use crate::error::CacheError;
use crate::model::{ModelDescriptor, ModelRegistry, QuerySource};
use crate::query::{FilterOp, OrderDirection, QueryHandle, RowHashExpr, HASH_SEPARATOR};
use crate::value::Value;
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

/// In-memory tables plus the model registry used for name resolution
pub struct MemoryExecutor {
    registry: ModelRegistry,
    tables: RwLock<HashMap<String, Vec<Row>>>,
    executions: AtomicU64,
}

impl MemoryExecutor {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            tables: RwLock::new(HashMap::new()),
            executions: AtomicU64::new(0),
        }
    }

    /// Number of query executions (row scans and aggregates) served so far.
    pub fn execution_count(&self) -> u64 {
        self.executions.load(AtomicOrdering::Relaxed)
    }

    /// Insert a row, stamping any auto-maintained timestamp columns.
    pub fn insert(&self, model: &ModelDescriptor, mut row: Row) {
        stamp_auto_now(model, &mut row);
        self.tables
            .write()
            .entry(model.table.clone())
            .or_default()
            .push(row);
    }

    /// Apply `mutate` to every row where `column == value`, re-stamping
    /// auto-maintained columns. Returns how many rows were touched.
    pub fn update_where<F>(
        &self,
        model: &ModelDescriptor,
        column: &str,
        value: &Value,
        mutate: F,
    ) -> usize
    where
        F: Fn(&mut Row),
    {
        let mut tables = self.tables.write();
        let rows = tables.entry(model.table.clone()).or_default();
        let mut touched = 0;
        for row in rows.iter_mut() {
            if row.get(column) == Some(value) {
                mutate(row);
                stamp_auto_now(model, row);
                touched += 1;
            }
        }
        touched
    }

    /// Re-save rows without changing their payload. The auto-now stamp
    /// still advances, exactly like an ORM save with no field changes.
    pub fn touch_where(&self, model: &ModelDescriptor, column: &str, value: &Value) -> usize {
        self.update_where(model, column, value, |_| {})
    }

    /// Delete every row where `column == value`; returns the removed count.
    pub fn delete_where(&self, model: &ModelDescriptor, column: &str, value: &Value) -> usize {
        let mut tables = self.tables.write();
        let rows = tables.entry(model.table.clone()).or_default();
        let before = rows.len();
        rows.retain(|row| row.get(column) != Some(value));
        before - rows.len()
    }

    fn matched_rows(&self, query: &QueryHandle) -> Result<Vec<Row>, CacheError> {
        let model = query.model();
        for predicate in query.filters() {
            if !model.has_column(&predicate.column) {
                return Err(CacheError::Execution(format!(
                    "Unknown filter column '{}' on table '{}'",
                    predicate.column, model.table
                )));
            }
        }

        let tables = self.tables.read();
        let mut rows: Vec<Row> = tables
            .get(&model.table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| matches_filters(row, query))
            .collect();
        drop(tables);

        if !query.order().is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, query.order()));
        }

        let offset = query.offset_value().unwrap_or(0);
        let rows: Vec<Row> = match query.limit_value() {
            Some(limit) => rows.into_iter().skip(offset).take(limit).collect(),
            None => rows.into_iter().skip(offset).collect(),
        };
        Ok(rows)
    }
}

impl QueryExecutor for MemoryExecutor {
    fn resolve(
        &self,
        source: &QuerySource,
    ) -> Result<(QueryHandle, Arc<ModelDescriptor>), CacheError> {
        match source {
            QuerySource::Model(model) => {
                Ok((QueryHandle::all(model.clone()), model.clone()))
            }
            QuerySource::Query(query) => Ok((query.clone(), query.model().clone())),
            QuerySource::Name(namespace, name) => {
                let model = self.registry.get(namespace, name).ok_or_else(|| {
                    CacheError::Resolution(format!(
                        "No registered model named {namespace}.{name}"
                    ))
                })?;
                Ok((QueryHandle::all(model.clone()), model))
            }
        }
    }

    fn rows(&self, query: &QueryHandle) -> Result<Vec<Row>, CacheError> {
        self.executions.fetch_add(1, AtomicOrdering::Relaxed);
        let matched = self.matched_rows(query)?;
        let model = query.model();

        let output_columns = query.output_columns();
        let mut out = Vec::with_capacity(matched.len());
        for row in matched {
            let mut projected = if query.projection().is_some() {
                row.project(&output_columns)
            } else {
                row.clone()
            };
            if let Some((name, expr)) = query.annotation() {
                projected.set(name, Value::Text(evaluate_hash_expr(expr, &row, model.as_ref())));
            }
            out.push(projected);
        }
        Ok(out)
    }

    fn aggregate(
        &self,
        query: &QueryHandle,
        timestamp_column: &str,
    ) -> Result<TableAggregate, CacheError> {
        self.executions.fetch_add(1, AtomicOrdering::Relaxed);
        if !query.model().has_column(timestamp_column) {
            return Err(CacheError::Execution(format!(
                "Unknown timestamp column '{}' on table '{}'",
                timestamp_column,
                query.model().table
            )));
        }

        let matched = self.matched_rows(query)?;
        let newest = matched
            .iter()
            .filter_map(|row| row.get(timestamp_column).and_then(Value::as_datetime))
            .max();
        Ok(TableAggregate {
            row_count: matched.len() as u64,
            newest,
        })
    }
}

/// Evaluate a row hash expression the way a database would: cast the
/// selected columns to canonical text, join, digest.
fn evaluate_hash_expr(expr: &RowHashExpr, row: &Row, model: &ModelDescriptor) -> String {
    let mut joined = String::new();
    for (i, column) in expr.hash_columns(model).iter().enumerate() {
        if i > 0 {
            joined.push(HASH_SEPARATOR);
        }
        let text = row
            .get(column)
            .map(Value::canonical_text)
            .unwrap_or_default();
        joined.push_str(&text);
    }
    expr.hash_text(&joined)
}

fn matches_filters(row: &Row, query: &QueryHandle) -> bool {
    query.filters().iter().all(|predicate| {
        let actual = row.get(&predicate.column).unwrap_or(&Value::Null);
        let ordering = actual.compare(&predicate.value);
        match predicate.op {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
        }
    })
}

fn compare_rows(a: &Row, b: &Row, order: &[(String, OrderDirection)]) -> Ordering {
    for (column, direction) in order {
        let left = a.get(column).unwrap_or(&Value::Null);
        let right = b.get(column).unwrap_or(&Value::Null);
        let ordering = match direction {
            OrderDirection::Asc => left.compare(right),
            OrderDirection::Desc => right.compare(left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn stamp_auto_now(model: &ModelDescriptor, row: &mut Row) {
    for column in &model.columns {
        if column.auto_now {
            row.set(&column.name, Value::DateTime(Utc::now()));
        }
    }
}
