//! Detected SOD violation

use chrono::{DateTime, Utc};
use rolegraph_core::RoleRef;
use serde::{Deserialize, Serialize};

/// One violated constraint for one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SodViolation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,

    pub policy_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,

    /// Identity holding the conflicting roles
    pub identity: String,

    /// Matched left-hand roles
    #[serde(default)]
    pub left_roles: Vec<RoleRef>,

    /// Matched right-hand roles
    #[serde(default)]
    pub right_roles: Vec<RoleRef>,

    pub weight: i32,

    /// Formatting hooks carried over from the constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_rule: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_workflow: Option<String>,

    pub detected_at: DateTime<Utc>,
}

impl SodViolation {
    /// Create a violation with no matched roles
    pub fn new(policy_name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            policy_id: None,
            policy_name: policy_name.into(),
            constraint_id: None,
            constraint_name: None,
            identity: identity.into(),
            left_roles: Vec::new(),
            right_roles: Vec::new(),
            weight: 0,
            violation_rule: None,
            violation_workflow: None,
            detected_at: Utc::now(),
        }
    }

    /// Record a matched left-hand role, ignoring repeats
    pub fn add_left_role(&mut self, role: RoleRef) {
        if !self.left_roles.contains(&role) {
            self.left_roles.push(role);
        }
    }

    /// Record a matched right-hand role, ignoring repeats
    pub fn add_right_role(&mut self, role: RoleRef) {
        if !self.right_roles.contains(&role) {
            self.right_roles.push(role);
        }
    }

    /// Matched left-hand role names, comma separated
    pub fn left_summary(&self) -> String {
        summarize(&self.left_roles)
    }

    /// Matched right-hand role names, comma separated
    pub fn right_summary(&self) -> String {
        summarize(&self.right_roles)
    }
}

fn summarize(roles: &[RoleRef]) -> String {
    roles
        .iter()
        .map(RoleRef::display_name)
        .collect::<Vec<_>>()
        .join(",")
}
