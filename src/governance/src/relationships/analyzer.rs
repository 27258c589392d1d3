//! Relationship analyzer

use super::result::RoleRelationships;
use crate::error::{GovernanceError, Result};
use rolegraph_core::{Relation, RoleGraph, RoleId, RoleIdx, TraversalLimits};
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Builds [`RoleRelationships`] for one identity at a time
///
/// The analyzer only reads the graph. Every call to
/// [`analyze`](Self::analyze) rebuilds its result from scratch.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipAnalyzer<'g> {
    graph: &'g RoleGraph,
    limits: TraversalLimits,
}

impl<'g> RelationshipAnalyzer<'g> {
    /// Create an analyzer over `graph`
    pub fn new(graph: &'g RoleGraph, limits: TraversalLimits) -> Self {
        Self { graph, limits }
    }

    pub fn graph(&self) -> &'g RoleGraph {
        self.graph
    }

    pub fn limits(&self) -> TraversalLimits {
        self.limits
    }

    /// Analyze an identity's assigned and detected roles
    ///
    /// Identifiers missing from the graph are skipped, as are repeats.
    ///
    /// # Errors
    ///
    /// Fails with a graph error when a walk hits a cycle (under
    /// `CyclePolicy::Reject`) or exceeds the depth limit.
    pub fn analyze(&self, assigned: &[RoleId], detected: &[RoleId]) -> Result<RoleRelationships<'g>> {
        let assigned = self.resolve(assigned, "assigned");
        let detected = self.resolve(detected, "detected");

        let mut permitted: HashMap<RoleIdx, Vec<RoleIdx>> =
            assigned.iter().map(|role| (*role, Vec::new())).collect();

        let mut required = HashMap::with_capacity(assigned.len());
        for role in &assigned {
            let requirements = self.graph.inherited_requirements(*role, self.limits)?;
            required.insert(*role, requirements.to_vec());
        }

        let mut permitting = HashMap::with_capacity(detected.len());
        for detected_role in &detected {
            let mut permitted_by = Vec::new();

            for assigned_role in &assigned {
                if self.is_permitted(*assigned_role, *detected_role)? {
                    permitted_by.push(*assigned_role);

                    let entry = permitted.entry(*assigned_role).or_default();
                    if !entry.contains(detected_role) {
                        entry.push(*detected_role);
                    }
                }
            }

            permitting.insert(*detected_role, permitted_by);
        }

        let mut detected_ancestors = HashSet::new();
        for role in &detected {
            let ancestors = self.graph.flattened_inheritance(*role, self.limits)?;
            detected_ancestors.extend(ancestors.iter().copied());
        }

        debug!(
            "Analyzed {} assigned and {} detected roles",
            assigned.len(),
            detected.len()
        );

        Ok(RoleRelationships::new(
            self.graph,
            assigned,
            detected,
            permitted,
            permitting,
            required,
            detected_ancestors,
        ))
    }

    /// Whether `assigned` justifies holding `detected`
    ///
    /// True when:
    /// 1. both are the same role
    /// 2. `detected` is among the assigned role's permits
    /// 3. `detected` is among the assigned role's requirements
    /// 4. any inheritance ancestor of the assigned role satisfies 1-3
    ///
    /// A requirement counts as justification exactly like a permit does.
    /// Ancestors are searched depth-first in declaration order and the
    /// first match ends the search.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::InvalidInput`] when either index was not issued
    /// by this analyzer's graph.
    pub fn is_permitted(&self, assigned: RoleIdx, detected: RoleIdx) -> Result<bool> {
        for role in [assigned, detected] {
            if self.graph.get(role).is_none() {
                return Err(GovernanceError::invalid(format!(
                    "role index {} is not in a graph of {} roles",
                    role.index(),
                    self.graph.len()
                )));
            }
        }

        let found = self
            .graph
            .walk(assigned, &[Relation::Inherits], self.limits, |node, _| {
                if node.idx() == detected
                    || node.permits().contains(&detected)
                    || node.requirements().contains(&detected)
                {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })?;
        Ok(found)
    }

    fn resolve(&self, ids: &[RoleId], kind: &str) -> Vec<RoleIdx> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            match self.graph.lookup(id) {
                Some(idx) if !resolved.contains(&idx) => resolved.push(idx),
                Some(_) => {}
                None => warn!("Skipping unknown {} role: {}", kind, id),
            }
        }
        resolved
    }
}
