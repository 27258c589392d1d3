//! Role graph builder
//!
//! Collects role definitions, then resolves every edge reference into an
//! arena index in a single pass.

use super::{RoleGraph, RoleNode};
use crate::error::{GraphError, Result};
use crate::types::{Relation, RoleDefinition, RoleId, RoleIdx};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Builder for [`RoleGraph`]
#[derive(Debug, Clone, Default)]
pub struct RoleGraphBuilder {
    roles: Vec<RoleDefinition>,
    ids: HashSet<RoleId>,
}

impl RoleGraphBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The role id is empty
    /// - The role id was already added
    pub fn add_role(&mut self, role: RoleDefinition) -> Result<()> {
        if role.id.is_empty() {
            return Err(GraphError::invalid(format!(
                "role '{}' has an empty id",
                role.name
            )));
        }

        if !self.ids.insert(role.id.clone()) {
            return Err(GraphError::DuplicateRole(role.id));
        }

        self.roles.push(role);
        Ok(())
    }

    /// Add several role definitions
    pub fn add_roles<I>(&mut self, roles: I) -> Result<()>
    where
        I: IntoIterator<Item = RoleDefinition>,
    {
        for role in roles {
            self.add_role(role)?;
        }
        Ok(())
    }

    /// Number of roles added so far
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Resolve all edges and build the graph
    ///
    /// Edge lists keep declaration order with repeated targets removed.
    /// Cycles are not rejected here; see [`RoleGraph::detect_cycles`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownRole`] if any edge references a role
    /// that was never added.
    pub fn build(self) -> Result<RoleGraph> {
        let index: HashMap<&RoleId, RoleIdx> = self
            .roles
            .iter()
            .enumerate()
            .map(|(i, role)| (&role.id, RoleIdx::new(i)))
            .collect();

        let resolve = |role: &RoleDefinition, relation: Relation| -> Result<Vec<RoleIdx>> {
            let mut resolved = Vec::with_capacity(role.edges(relation).len());
            for target in role.edges(relation) {
                let idx = index.get(target).copied().ok_or_else(|| GraphError::UnknownRole {
                    role: target.clone(),
                    referenced_by: role.id.clone(),
                })?;
                if !resolved.contains(&idx) {
                    resolved.push(idx);
                }
            }
            Ok(resolved)
        };

        let mut nodes = Vec::with_capacity(self.roles.len());
        for (i, role) in self.roles.iter().enumerate() {
            nodes.push(RoleNode {
                idx: RoleIdx::new(i),
                id: role.id.clone(),
                name: role.name.clone(),
                inheritance: resolve(role, Relation::Inherits)?,
                requirements: resolve(role, Relation::Requires)?,
                permits: resolve(role, Relation::Permits)?,
            });
        }

        debug!("Role graph built with {} roles", nodes.len());

        Ok(RoleGraph::from_nodes(nodes))
    }
}
