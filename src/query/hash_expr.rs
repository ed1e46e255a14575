// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Row fingerprint expressions
//!
//! A `RowHashExpr` is the reducible, database-evaluated transform mapping
//! one row to a fixed-width hash token. Either the whole row or a chosen
//! column subset is cast to canonical text, joined with a fixed separator
//! and digested. The short (8 char) token is always a prefix of the full
//! (32 char) token of the same input, so short-mode and long-mode
//! fingerprints of identical data stay consistent prefixes.

use crate::hash::{digest_hex, FULL_WIDTH, SHORT_WIDTH};
use crate::model::ModelDescriptor;

/// Separator placed between column texts before hashing. A control
/// character keeps adjacent columns from concatenating ambiguously.
pub const HASH_SEPARATOR: char = '\u{1f}';

/// A per-row hash expression evaluated by the query executor
#[derive(Debug, Clone, PartialEq)]
pub enum RowHashExpr {
    /// Hash the entire row's canonical textual representation
    WholeRow { full: bool },
    /// Hash a caller-specified column subset, each cast to text
    Columns { columns: Vec<String>, full: bool },
}

impl RowHashExpr {
    /// Pick the variant for an optional field subset, as engines do: an
    /// empty subset means the whole row.
    pub fn for_fields(fields: &[String], full: bool) -> Self {
        if fields.is_empty() {
            RowHashExpr::WholeRow { full }
        } else {
            RowHashExpr::Columns {
                columns: fields.to_vec(),
                full,
            }
        }
    }

    /// Token width in hex characters.
    pub fn width(&self) -> usize {
        match self {
            RowHashExpr::WholeRow { full } | RowHashExpr::Columns { full, .. } => {
                if *full {
                    FULL_WIDTH
                } else {
                    SHORT_WIDTH
                }
            }
        }
    }

    /// The columns this expression reads, in model declaration order for
    /// the whole-row variant.
    pub fn hash_columns<'a>(&'a self, model: &'a ModelDescriptor) -> Vec<&'a str> {
        match self {
            RowHashExpr::WholeRow { .. } => model.column_names(),
            RowHashExpr::Columns { columns, .. } => {
                columns.iter().map(|c| c.as_str()).collect()
            }
        }
    }

    /// Digest the joined canonical text of the selected columns.
    pub fn hash_text(&self, joined: &str) -> String {
        digest_hex(joined, self.width())
    }

    /// Statement-text form of this expression, used for key derivation.
    pub fn to_sql(&self, table: &str) -> String {
        let width = self.width();
        match self {
            RowHashExpr::WholeRow { .. } => {
                format!("SUBSTRING(SHA256(\"{table}\"::text) FOR {width})")
            }
            RowHashExpr::Columns { columns, .. } => {
                let cast: Vec<String> =
                    columns.iter().map(|c| format!("\"{c}\"::text")).collect();
                format!("SUBSTRING(SHA256({}) FOR {width})", cast.join("||"))
            }
        }
    }
}
