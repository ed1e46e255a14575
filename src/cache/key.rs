// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache key derivation
//!
//! Keys are derived from a query's structural shape: the compiled statement
//! text and the bound parameter values are hashed independently, each
//! truncated to four hex characters, and composed as
//! `{table}_{statement_hash}{params_hash}{suffix}`. Hashing the two parts
//! separately keeps the key length bounded regardless of parameter count
//! and means a change to only one part recomputes only that digest.

use crate::hash::digest_hex;
use crate::query::QueryHandle;

const PART_WIDTH: usize = 4;

/// Derive the stable cache key for a query handle.
///
/// Two handles with identical compiled statement text and identical bound
/// parameters always produce the same key; any difference in statement
/// shape or parameter values produces a different key with very high
/// probability. Never fails.
pub fn query_to_key(query: &QueryHandle, suffix: &str) -> String {
    let statement = query.compile();
    let statement_hash = digest_hex(&statement.text, PART_WIDTH);

    let joined_params: String = statement
        .params
        .iter()
        .map(|p| p.canonical_text())
        .collect();
    let params_hash = digest_hex(&joined_params, PART_WIDTH);

    format!(
        "{}_{}{}{}",
        query.model().table,
        statement_hash,
        params_hash,
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::query_to_key;
    use crate::model::{ColumnDescriptor, ModelDescriptor};
    use crate::query::{FilterOp, QueryHandle};
    use crate::value::Value;
    use std::sync::Arc;

    fn model() -> Arc<ModelDescriptor> {
        Arc::new(ModelDescriptor::new(
            "tests",
            "Record",
            "tests_record",
            vec![
                ColumnDescriptor::new("id"),
                ColumnDescriptor::new("category"),
            ],
        ))
    }

    #[test]
    fn identical_queries_share_a_key() {
        let a = QueryHandle::all(model()).filter("category", FilterOp::Eq, Value::from("A"));
        let b = QueryHandle::all(model()).filter("category", FilterOp::Eq, Value::from("A"));
        assert_eq!(query_to_key(&a, ""), query_to_key(&b, ""));
    }

    #[test]
    fn parameter_changes_change_the_key() {
        let a = QueryHandle::all(model()).filter("category", FilterOp::Eq, Value::from("A"));
        let b = QueryHandle::all(model()).filter("category", FilterOp::Eq, Value::from("B"));
        assert_ne!(query_to_key(&a, ""), query_to_key(&b, ""));
    }

    #[test]
    fn statement_changes_change_the_key() {
        let a = QueryHandle::all(model());
        let b = QueryHandle::all(model()).limit(4);
        assert_ne!(query_to_key(&a, ""), query_to_key(&b, ""));
    }

    #[test]
    fn key_is_prefixed_with_table_and_suffixed_as_asked() {
        let key = query_to_key(&QueryHandle::all(model()), "_hash");
        assert!(key.starts_with("tests_record_"));
        assert!(key.ends_with("_hash"));
    }
}
