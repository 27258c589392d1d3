//! Role graph arena
//!
//! Roles are stored in a flat arena and addressed by [`RoleIdx`]. Edges are
//! resolved once at build time, so every traversal works on indices instead
//! of chasing references.
//!
//! # Example
//!
//! ```rust
//! use rolegraph_core::{RoleDefinition, RoleGraphBuilder, RoleId, TraversalLimits};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RoleGraphBuilder::new();
//! builder.add_role(RoleDefinition::new("employee", "Employee").requires("badge"))?;
//! builder.add_role(RoleDefinition::new("badge", "Badge Access"))?;
//! builder.add_role(RoleDefinition::new("manager", "Manager").inherits("employee"))?;
//! let graph = builder.build()?;
//!
//! let manager = graph.lookup(&RoleId::from("manager")).unwrap();
//! let required = graph.inherited_requirements(manager, TraversalLimits::default())?;
//! assert_eq!(graph.ids(&required), vec![RoleId::from("badge")]);
//! # Ok(())
//! # }
//! ```

mod builder;
mod cycles;
mod path;
mod traverse;


pub use builder::RoleGraphBuilder;
pub use path::PathStep;
pub use traverse::ClosureKind;

use crate::limits::TraversalLimits;
use crate::types::{Relation, RoleId, RoleIdx, RoleRef};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolved role node
#[derive(Debug, Clone)]
pub struct RoleNode {
    pub(crate) idx: RoleIdx,
    pub(crate) id: RoleId,
    pub(crate) name: String,
    pub(crate) inheritance: Vec<RoleIdx>,
    pub(crate) requirements: Vec<RoleIdx>,
    pub(crate) permits: Vec<RoleIdx>,
}

impl RoleNode {
    pub fn idx(&self) -> RoleIdx {
        self.idx
    }

    pub fn id(&self) -> &RoleId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inheritance parents, in declaration order
    pub fn inheritance(&self) -> &[RoleIdx] {
        &self.inheritance
    }

    /// Required roles, in declaration order
    pub fn requirements(&self) -> &[RoleIdx] {
        &self.requirements
    }

    /// Permitted roles, in declaration order
    pub fn permits(&self) -> &[RoleIdx] {
        &self.permits
    }

    /// Edge targets for a relation
    pub fn edges(&self, relation: Relation) -> &[RoleIdx] {
        match relation {
            Relation::Inherits => &self.inheritance,
            Relation::Requires => &self.requirements,
            Relation::Permits => &self.permits,
        }
    }

    /// Edge targets for several relations, chained in the given order
    pub fn edges_for<'a>(&'a self, follow: &'a [Relation]) -> impl Iterator<Item = RoleIdx> + 'a {
        follow
            .iter()
            .flat_map(move |relation| self.edges(*relation).iter().copied())
    }

    pub fn role_ref(&self) -> RoleRef {
        RoleRef::new(self.id.clone(), self.name.clone())
    }
}

/// Key of a memoised closure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ClosureKey {
    pub(crate) role: RoleIdx,
    pub(crate) kind: ClosureKind,
    pub(crate) limits: TraversalLimits,
}

/// Immutable role graph
///
/// The graph never changes after [`RoleGraphBuilder::build`]. Closure
/// queries are memoised in a concurrent map, so one graph can be shared
/// behind an `Arc` by any number of analysis workers.
#[derive(Debug, Clone)]
pub struct RoleGraph {
    nodes: Vec<RoleNode>,
    index: HashMap<RoleId, RoleIdx>,
    closures: Arc<DashMap<ClosureKey, Arc<[RoleIdx]>>>,
}

impl RoleGraph {
    pub(crate) fn from_nodes(nodes: Vec<RoleNode>) -> Self {
        let index = nodes.iter().map(|n| (n.id.clone(), n.idx)).collect();
        Self {
            nodes,
            index,
            closures: Arc::new(DashMap::new()),
        }
    }

    /// Number of roles
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node for an index issued by this graph
    ///
    /// # Panics
    ///
    /// Panics if `idx` was issued by another graph with fewer roles.
    pub fn node(&self, idx: RoleIdx) -> &RoleNode {
        &self.nodes[idx.index()]
    }

    /// Node for an index, or `None` if out of range
    pub fn get(&self, idx: RoleIdx) -> Option<&RoleNode> {
        self.nodes.get(idx.index())
    }

    /// Find a role by stable identifier
    pub fn lookup(&self, id: &RoleId) -> Option<RoleIdx> {
        self.index.get(id).copied()
    }

    /// Find the first role with the given name
    pub fn lookup_name(&self, name: &str) -> Option<RoleIdx> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.idx)
    }

    pub fn id(&self, idx: RoleIdx) -> &RoleId {
        &self.node(idx).id
    }

    pub fn name(&self, idx: RoleIdx) -> &str {
        &self.node(idx).name
    }

    pub fn role_ref(&self, idx: RoleIdx) -> RoleRef {
        self.node(idx).role_ref()
    }

    /// Map indices to stable identifiers, preserving order
    pub fn ids(&self, roles: &[RoleIdx]) -> Vec<RoleId> {
        roles.iter().map(|r| self.id(*r).clone()).collect()
    }

    /// Map indices to names, preserving order
    pub fn names(&self, roles: &[RoleIdx]) -> Vec<String> {
        roles.iter().map(|r| self.name(*r).to_string()).collect()
    }

    /// Iterate over all roles in arena order
    pub fn iter(&self) -> impl Iterator<Item = &RoleNode> {
        self.nodes.iter()
    }

    /// Number of memoised closures
    pub fn cached_closures(&self) -> usize {
        self.closures.len()
    }

    /// Drop all memoised closures
    pub fn clear_cache(&self) {
        self.closures.clear();
    }
}
