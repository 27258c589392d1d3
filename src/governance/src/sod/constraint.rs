//! Segregation of duty constraint

use rolegraph_core::{RoleId, RoleRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Two role sets that must not be held together
///
/// A conflict exists when the effective role set meets the left side and
/// also meets the right side. Which left/right pair caused it is not part
/// of the answer; see [`conflicting_roles`](Self::conflicting_roles) for
/// the matched roles on each side. A role may appear on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SodConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Left-hand roles, in declaration order
    #[serde(default)]
    pub left: Vec<RoleRef>,

    /// Right-hand roles, in declaration order
    #[serde(default)]
    pub right: Vec<RoleRef>,

    /// Contribution to the policy score when violated
    #[serde(default)]
    pub weight: i32,

    #[serde(default)]
    pub disabled: bool,

    /// Rule that formats violations of this constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_rule: Option<String>,

    /// Workflow launched for violations of this constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_workflow: Option<String>,
}

impl SodConstraint {
    /// Create an empty, enabled constraint
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            description: None,
            left: Vec::new(),
            right: Vec::new(),
            weight: 0,
            disabled: false,
            violation_rule: None,
            violation_workflow: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a left-hand role
    pub fn left(mut self, role: RoleRef) -> Self {
        self.left.push(role);
        self
    }

    /// Add a right-hand role
    pub fn right(mut self, role: RoleRef) -> Self {
        self.right.push(role);
        self
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Whether any effective role is on the left side
    pub fn matches_left(&self, effective: &HashSet<RoleId>) -> bool {
        intersects(&self.left, effective)
    }

    /// Whether any effective role is on the right side
    pub fn matches_right(&self, effective: &HashSet<RoleId>) -> bool {
        intersects(&self.right, effective)
    }

    /// Whether the effective role set violates this constraint
    ///
    /// A constraint with an empty side can never conflict.
    pub fn has_conflict(&self, effective: &HashSet<RoleId>) -> bool {
        self.matches_left(effective) && self.matches_right(effective)
    }

    /// Effective roles matched on the left and on the right side
    ///
    /// Each side is de-duplicated and keeps declaration order. Both lists
    /// are empty unless [`has_conflict`](Self::has_conflict) holds.
    pub fn conflicting_roles(&self, effective: &HashSet<RoleId>) -> (Vec<RoleRef>, Vec<RoleRef>) {
        if !self.has_conflict(effective) {
            return (Vec::new(), Vec::new());
        }
        (matched(&self.left, effective), matched(&self.right, effective))
    }

    /// Name for display, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or_default()
    }
}

fn intersects(side: &[RoleRef], effective: &HashSet<RoleId>) -> bool {
    side.iter().any(|role| effective.contains(&role.id))
}

fn matched(side: &[RoleRef], effective: &HashSet<RoleId>) -> Vec<RoleRef> {
    let mut roles: Vec<RoleRef> = Vec::new();
    for role in side {
        if effective.contains(&role.id) && !roles.contains(role) {
            roles.push(role.clone());
        }
    }
    roles
}

/// `"left1,left2 : right1,right2"`, by role name
impl fmt::Display for SodConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |side: &[RoleRef]| {
            side.iter()
                .map(RoleRef::display_name)
                .collect::<Vec<_>>()
                .join(",")
        };
        write!(f, "{} : {}", join(&self.left), join(&self.right))
    }
}
