// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution boundary
//!
//! The fingerprint engines never talk to a database directly; they go
//! through the [`QueryExecutor`] trait. [`MemoryExecutor`] is the bundled
//! implementation backing tests and embedders without an external store.

pub mod executor;
pub mod memory;
pub mod row;

pub use executor::{QueryExecutor, TableAggregate};
pub use memory::MemoryExecutor;
pub use row::Row;
