// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query handle construction and compilation

use super::hash_expr::RowHashExpr;
use crate::model::ModelDescriptor;
use crate::value::Value;
use std::fmt::Write as _;
use std::sync::Arc;

/// Comparison operators for filter predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    fn sql(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "<>",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
        }
    }
}

/// One filter predicate: `column <op> value`
#[derive(Debug, Clone)]
pub struct Predicate {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Sort direction for an ordering term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    fn flipped(self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// A compiled statement: text plus its ordered parameter list
#[derive(Debug, Clone)]
pub struct Statement {
    pub text: String,
    pub params: Vec<Value>,
}

/// An immutable, composable description of a filtered/ordered/sliced view
/// over one table.
///
/// Builder methods consume and return the handle; an engine captures the
/// final handle once and never mutates it afterwards.
#[derive(Debug, Clone)]
pub struct QueryHandle {
    model: Arc<ModelDescriptor>,
    filters: Vec<Predicate>,
    order: Vec<(String, OrderDirection)>,
    limit: Option<usize>,
    offset: Option<usize>,
    projection: Option<Vec<String>>,
    annotation: Option<(String, RowHashExpr)>,
}

impl QueryHandle {
    /// An unfiltered query over the whole model.
    pub fn all(model: Arc<ModelDescriptor>) -> Self {
        Self {
            model,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            projection: None,
            annotation: None,
        }
    }

    pub fn model(&self) -> &Arc<ModelDescriptor> {
        &self.model
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    pub fn order(&self) -> &[(String, OrderDirection)] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<usize> {
        self.offset
    }

    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    pub fn annotation(&self) -> Option<&(String, RowHashExpr)> {
        self.annotation.as_ref()
    }

    pub fn filter(mut self, column: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Predicate {
            column: column.to_string(),
            op,
            value,
        });
        self
    }

    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    /// Flip every ordering term. Ordering does not change which rows are
    /// matched, only the cursor order.
    pub fn reversed(mut self) -> Self {
        for (_, direction) in &mut self.order {
            *direction = direction.flipped();
        }
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Project to a subset of columns.
    pub fn project(mut self, columns: &[&str]) -> Self {
        self.projection = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Annotate every row with a computed hash expression under `name`.
    pub fn annotate(mut self, name: &str, expr: RowHashExpr) -> Self {
        self.annotation = Some((name.to_string(), expr));
        self
    }

    /// True when the handle slices its row set.
    pub fn is_sliced(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// The columns a serializer should emit: the projection if one was set,
    /// otherwise every model column.
    pub fn output_columns(&self) -> Vec<String> {
        match &self.projection {
            Some(cols) => cols.clone(),
            None => self
                .model
                .column_names()
                .into_iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// Compile to statement text plus the ordered parameter list.
    ///
    /// The text is deterministic for a given handle shape: two handles with
    /// the same filters, ordering, slice, projection and annotation compile
    /// to byte-identical text, which is what key derivation relies on.
    pub fn compile(&self) -> Statement {
        let mut text = String::from("SELECT ");
        let cols = self.output_columns();
        let quoted: Vec<String> = cols.iter().map(|c| format!("\"{c}\"")).collect();
        text.push_str(&quoted.join(", "));

        if let Some((name, expr)) = &self.annotation {
            let _ = write!(text, ", {} AS \"{}\"", expr.to_sql(&self.model.table), name);
        }

        let _ = write!(text, " FROM \"{}\"", self.model.table);

        let mut params = Vec::new();
        if !self.filters.is_empty() {
            let clauses: Vec<String> = self
                .filters
                .iter()
                .map(|p| {
                    params.push(p.value.clone());
                    format!("\"{}\" {} ?", p.column, p.op.sql())
                })
                .collect();
            let _ = write!(text, " WHERE {}", clauses.join(" AND "));
        }

        if !self.order.is_empty() {
            let terms: Vec<String> = self
                .order
                .iter()
                .map(|(col, dir)| format!("\"{col}\" {}", dir.sql()))
                .collect();
            let _ = write!(text, " ORDER BY {}", terms.join(", "));
        }

        if let Some(n) = self.limit {
            let _ = write!(text, " LIMIT {n}");
        }
        if let Some(n) = self.offset {
            let _ = write!(text, " OFFSET {n}");
        }

        Statement {
            text,
            params,
        }
    }
}
