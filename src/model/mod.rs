// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Model descriptors and registration
//!
//! A [`ModelDescriptor`] names the backing table and its columns, including
//! which column (if any) is maintained automatically on every write. Models
//! are registered under a `(namespace, name)` pair so queries can be
//! resolved from plain identifiers.

pub mod descriptor;
pub mod registry;
pub mod source;

pub use descriptor::{ColumnDescriptor, ModelDescriptor};
pub use registry::ModelRegistry;
pub use source::QuerySource;
