//! # Rolegraph Core
//!
//! Role graph accessor for relationship and segregation-of-duty analysis.
//!
//! ## Features
//!
//! - **Arena storage**: roles addressed by dense [`RoleIdx`] indices
//! - **Three relations**: inheritance, requirement and permit edges
//! - **Guarded walks**: explicit cycle policy and depth limit on every traversal
//! - **Cycle detection**: iterative three-colour DFS with path reporting
//! - **Memoised closures**: `DashMap` cache, safe to share across workers

pub mod error;
pub mod graph;
pub mod limits;
pub mod types;

// Re-export commonly used types
pub use error::{GraphError, Result};
pub use graph::{ClosureKind, PathStep, RoleGraph, RoleGraphBuilder, RoleNode};
pub use limits::{CyclePolicy, TraversalLimits, DEFAULT_MAX_DEPTH};
pub use types::{Relation, RoleDefinition, RoleId, RoleIdx, RoleRef};
