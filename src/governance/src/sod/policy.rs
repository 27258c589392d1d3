//! SOD policy: a named set of constraints

use super::{SodConstraint, SodViolation};
use rolegraph_core::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Named group of SOD constraints evaluated together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SodPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A disabled policy reports nothing
    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub constraints: Vec<SodConstraint>,
}

impl SodPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            disabled: false,
            constraints: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a constraint
    pub fn with_constraint(mut self, constraint: SodConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Find a constraint by id, then by name
    ///
    /// The id wins whenever it is given and matches, even if `name`
    /// matches a different constraint.
    pub fn constraint(&self, id: Option<&str>, name: Option<&str>) -> Option<&SodConstraint> {
        if let Some(id) = id {
            if let Some(found) = self.constraints.iter().find(|c| c.id.as_deref() == Some(id)) {
                return Some(found);
            }
        }
        name.and_then(|name| {
            self.constraints
                .iter()
                .find(|c| c.name.as_deref() == Some(name))
        })
    }

    /// Evaluate every enabled constraint against an identity's effective roles
    ///
    /// Returns one violation per conflicting constraint, in constraint order.
    pub fn evaluate(&self, identity: &str, effective: &HashSet<RoleId>) -> Vec<SodViolation> {
        if self.disabled {
            debug!("Skipping disabled policy {}", self.name);
            return Vec::new();
        }

        let mut violations = Vec::new();
        for constraint in self.constraints.iter().filter(|c| !c.disabled) {
            let (left, right) = constraint.conflicting_roles(effective);
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let mut violation = SodViolation::new(self.name.clone(), identity);
            violation.policy_id = self.id.clone();
            violation.constraint_id = constraint.id.clone();
            violation.constraint_name = constraint.name.clone();
            violation.weight = constraint.weight;
            violation.violation_rule = constraint.violation_rule.clone();
            violation.violation_workflow = constraint.violation_workflow.clone();
            for role in left {
                violation.add_left_role(role);
            }
            for role in right {
                violation.add_right_role(role);
            }

            info!(
                "SOD violation for {}: {} ({} : {})",
                identity,
                constraint.display_name(),
                violation.left_summary(),
                violation.right_summary()
            );
            violations.push(violation);
        }
        violations
    }
}
