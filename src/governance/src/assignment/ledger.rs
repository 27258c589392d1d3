//! Per-identity record of assignment decisions

use super::{AssignmentState, RoleAssignment};
use crate::error::{GovernanceError, Result};
use chrono::{DateTime, Utc};
use rolegraph_core::RoleId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every assignment decision made for one identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentLedger {
    /// Identity name
    pub identity: String,

    #[serde(default)]
    pub assignments: Vec<RoleAssignment>,
}

impl RoleAssignmentLedger {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            assignments: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Record a new assignment
    ///
    /// # Errors
    ///
    /// [`GovernanceError::InvalidInput`] if the assignment id is already
    /// recorded; use [`merge`](Self::merge) to fold updates in.
    pub fn add(&mut self, assignment: RoleAssignment) -> Result<()> {
        if self.get(&assignment.assignment_id).is_some() {
            return Err(GovernanceError::invalid(format!(
                "assignment {} already recorded for {}",
                assignment.assignment_id, self.identity
            )));
        }
        self.assignments.push(assignment);
        Ok(())
    }

    pub fn get(&self, assignment_id: &str) -> Option<&RoleAssignment> {
        self.assignments
            .iter()
            .find(|a| a.assignment_id == assignment_id)
    }

    pub fn get_mut(&mut self, assignment_id: &str) -> Option<&mut RoleAssignment> {
        self.assignments
            .iter_mut()
            .find(|a| a.assignment_id == assignment_id)
    }

    /// Assignments of a role, in any state
    pub fn for_role<'a>(&'a self, role: &'a RoleId) -> impl Iterator<Item = &'a RoleAssignment> + 'a {
        self.assignments
            .iter()
            .filter(move |a| a.role_id.as_ref() == Some(role))
    }

    /// Retract a recorded assignment
    pub fn retract(&mut self, assignment_id: &str) -> Result<()> {
        let identity = self.identity.clone();
        let assignment = self.get_mut(assignment_id).ok_or_else(|| {
            GovernanceError::invalid(format!(
                "no assignment {} recorded for {}",
                assignment_id, identity
            ))
        })?;
        assignment.retract()?;
        debug!("Retracted {} for {}", assignment.role_name, identity);
        Ok(())
    }

    /// Fold an assignment into the ledger
    ///
    /// An assignment with a recorded id contributes its new targets and
    /// permits to the recorded one; anything else is appended.
    pub fn merge(&mut self, assignment: RoleAssignment) {
        match self.get_mut(&assignment.assignment_id) {
            Some(existing) => {
                for target in assignment.targets {
                    existing.add_role_target(target);
                }
                for permit in assignment.permits {
                    existing.add_permitted_role(permit);
                }
            }
            None => self.assignments.push(assignment),
        }
    }

    /// Assignments in effect at `now`
    pub fn active_assignments(&self, now: DateTime<Utc>) -> impl Iterator<Item = &RoleAssignment> {
        self.assignments.iter().filter(move |a| a.is_active_at(now))
    }

    /// Ids of the roles in effect at `now`, first occurrence order
    ///
    /// Assignments without a role id are left out.
    pub fn assigned_role_ids(&self, now: DateTime<Utc>) -> Vec<RoleId> {
        let mut ids: Vec<RoleId> = Vec::new();
        for assignment in self.active_assignments(now) {
            if let Some(id) = &assignment.role_id {
                if !id.is_empty() && !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }

    /// Remove every system-promoted permit from every assignment
    ///
    /// Returns the number of permits removed.
    pub fn demote_soft_permits(&mut self, system_assigner: &str) -> usize {
        let mut removed = 0;
        for assignment in &mut self.assignments {
            let before = assignment.permits.len();
            assignment
                .permits
                .retain(|permit| !permit.is_promoted_by(system_assigner));
            removed += before - assignment.permits.len();
        }
        removed
    }

    /// Number of assignments in `state`
    pub fn count_in_state(&self, state: AssignmentState) -> usize {
        self.assignments.iter().filter(|a| a.state == state).count()
    }
}
