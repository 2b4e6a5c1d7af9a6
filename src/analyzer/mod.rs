//! Semantic analysis.
//!
//! [`analyzer::analyze`] walks the tree from the root block, resolving names
//! through a chain of [`environment::Environment`]s built from the per-block
//! name tables, and records inferred types, effects, copy requirements and
//! usage counters in an [`annotations::Annotations`] side table.

pub mod analyzer;
pub mod annotations;
pub mod environment;
