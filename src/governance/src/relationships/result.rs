//! Relationship analysis result

use crate::error::{GovernanceError, Result};
use rolegraph_core::{RoleGraph, RoleId, RoleIdx};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Relationships between one identity's assigned and detected roles
///
/// Every assigned role is a key of the permitted map and every detected
/// role is a key of the permitting map, even when the value is empty.
/// Results compare by content.
#[derive(Debug, Clone)]
pub struct RoleRelationships<'g> {
    graph: &'g RoleGraph,
    assigned: Vec<RoleIdx>,
    detected: Vec<RoleIdx>,
    /// assigned role -> detected roles it permits
    permitted: HashMap<RoleIdx, Vec<RoleIdx>>,
    /// detected role -> assigned roles that permit it
    permitting: HashMap<RoleIdx, Vec<RoleIdx>>,
    /// assigned role -> roles it requires directly or through inheritance
    required: HashMap<RoleIdx, Vec<RoleIdx>>,
    /// inheritance ancestors of every detected role
    detected_ancestors: HashSet<RoleIdx>,
}

impl<'g> RoleRelationships<'g> {
    pub(crate) fn new(
        graph: &'g RoleGraph,
        assigned: Vec<RoleIdx>,
        detected: Vec<RoleIdx>,
        permitted: HashMap<RoleIdx, Vec<RoleIdx>>,
        permitting: HashMap<RoleIdx, Vec<RoleIdx>>,
        required: HashMap<RoleIdx, Vec<RoleIdx>>,
        detected_ancestors: HashSet<RoleIdx>,
    ) -> Self {
        Self {
            graph,
            assigned,
            detected,
            permitted,
            permitting,
            required,
            detected_ancestors,
        }
    }

    pub fn graph(&self) -> &'g RoleGraph {
        self.graph
    }

    /// Assigned roles, in input order
    pub fn assigned(&self) -> &[RoleIdx] {
        &self.assigned
    }

    /// Detected roles, in input order
    pub fn detected(&self) -> &[RoleIdx] {
        &self.detected
    }

    /// Detected roles permitted by an assigned role
    pub fn permitted_roles(&self, assigned: RoleIdx) -> Option<&[RoleIdx]> {
        self.permitted.get(&assigned).map(Vec::as_slice)
    }

    /// Assigned roles permitting a detected role
    pub fn permitting_roles(&self, detected: RoleIdx) -> Option<&[RoleIdx]> {
        self.permitting.get(&detected).map(Vec::as_slice)
    }

    /// Roles that `role` requires, directly or through its ancestors
    ///
    /// # Errors
    ///
    /// [`GovernanceError::NotAnalyzed`] unless `role` was analyzed as an
    /// assigned role.
    pub fn required_roles(&self, role: RoleIdx) -> Result<&[RoleIdx]> {
        self.required
            .get(&role)
            .map(Vec::as_slice)
            .ok_or_else(|| self.not_analyzed(role))
    }

    /// Whether `assigned` requires `detected`
    pub fn is_required(&self, assigned: RoleIdx, detected: RoleIdx) -> Result<bool> {
        Ok(self.required_roles(assigned)?.contains(&detected))
    }

    /// Required roles of `role` the identity does not hold
    ///
    /// See [`has_role`](Self::has_role) for what counts as held.
    pub fn missing_requirements(&self, role: RoleIdx) -> Result<Vec<RoleIdx>> {
        Ok(self
            .required_roles(role)?
            .iter()
            .copied()
            .filter(|required| !self.has_role(*required))
            .collect())
    }

    /// Whether the identity holds `role`
    ///
    /// A role is held when it was assigned, when it was detected, or when
    /// it is an inheritance ancestor of any detected role.
    pub fn has_role(&self, role: RoleIdx) -> bool {
        self.permitted.contains_key(&role)
            || self.permitting.contains_key(&role)
            || self.detected_ancestors.contains(&role)
    }

    /// Stable ids of every assigned and detected role found in the graph
    ///
    /// Ids the analysis skipped are not included; callers holding the raw
    /// id lists should build the SOD input from those instead.
    pub fn effective_role_ids(&self) -> HashSet<RoleId> {
        self.assigned
            .iter()
            .chain(self.detected.iter())
            .map(|role| self.graph.id(*role).clone())
            .collect()
    }

    /// Detached, id-keyed copy of the relationship maps
    pub fn summary(&self) -> Result<RelationshipSummary> {
        let ids = |roles: &[RoleIdx]| self.graph.ids(roles);

        let mut summary = RelationshipSummary::default();
        for role in &self.assigned {
            let id = self.graph.id(*role).clone();
            summary
                .permitted
                .insert(id.clone(), ids(self.permitted_roles(*role).unwrap_or_default()));
            summary.required.insert(id.clone(), ids(self.required_roles(*role)?));

            let missing = self.missing_requirements(*role)?;
            if !missing.is_empty() {
                summary.missing.insert(id, ids(&missing));
            }
        }
        for role in &self.detected {
            summary.permitting.insert(
                self.graph.id(*role).clone(),
                ids(self.permitting_roles(*role).unwrap_or_default()),
            );
        }
        Ok(summary)
    }

    fn not_analyzed(&self, role: RoleIdx) -> GovernanceError {
        let id = self
            .graph
            .get(role)
            .map(|node| node.id().clone())
            .unwrap_or_else(|| RoleId::new(format!("#{}", role.index())));
        GovernanceError::NotAnalyzed(id)
    }
}

impl PartialEq for RoleRelationships<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.assigned == other.assigned
            && self.detected == other.detected
            && self.permitted == other.permitted
            && self.permitting == other.permitting
            && self.required == other.required
            && self.detected_ancestors == other.detected_ancestors
    }
}

impl Eq for RoleRelationships<'_> {}

/// Relationship maps keyed by stable role id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSummary {
    /// assigned role -> detected roles it permits
    pub permitted: BTreeMap<RoleId, Vec<RoleId>>,

    /// detected role -> assigned roles that permit it
    pub permitting: BTreeMap<RoleId, Vec<RoleId>>,

    /// assigned role -> roles it requires
    pub required: BTreeMap<RoleId, Vec<RoleId>>,

    /// assigned role -> required roles not held (only non-empty entries)
    #[serde(default)]
    pub missing: BTreeMap<RoleId, Vec<RoleId>>,
}
