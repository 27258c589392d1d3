//! Core role graph types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable role identifier
///
/// Roles loaded at different times (or from different snapshots) are the
/// same role exactly when their identifiers are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Create a new role identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RoleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Arena index of a role inside one [`RoleGraph`](crate::RoleGraph)
///
/// Indices are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleIdx(u32);

impl RoleIdx {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the role in the graph arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Role reference carrying a display name
///
/// Two references are equal when their ids are equal; the name is only
/// for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRef {
    /// Stable role identifier
    pub id: RoleId,

    /// Display name (falls back to the id when unknown)
    #[serde(default)]
    pub name: String,
}

impl RoleRef {
    /// Create a new reference
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Name to show for this role
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

impl PartialEq for RoleRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RoleRef {}

impl std::hash::Hash for RoleRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Kind of edge between two roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Child role extends the parent's edges
    Inherits,
    /// Prerequisite role
    Requires,
    /// Role the source role justifies as also held
    Permits,
}

impl Relation {
    /// All relations, in the order paths are searched
    pub const ALL: [Relation; 3] = [Relation::Inherits, Relation::Requires, Relation::Permits];
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relation::Inherits => "inherits",
            Relation::Requires => "requires",
            Relation::Permits => "permits",
        };
        f.write_str(s)
    }
}

/// Role definition as supplied by the role model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Stable role identifier
    pub id: RoleId,

    /// Role name
    pub name: String,

    /// Inheritance parents, in declaration order
    #[serde(default)]
    pub inheritance: Vec<RoleId>,

    /// Required roles, in declaration order
    #[serde(default)]
    pub requirements: Vec<RoleId>,

    /// Permitted roles, in declaration order
    #[serde(default)]
    pub permits: Vec<RoleId>,
}

impl RoleDefinition {
    /// Create a role with no edges
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inheritance: Vec::new(),
            requirements: Vec::new(),
            permits: Vec::new(),
        }
    }

    /// Add an inheritance parent
    pub fn inherits(mut self, parent: impl Into<RoleId>) -> Self {
        self.inheritance.push(parent.into());
        self
    }

    /// Add a required role
    pub fn requires(mut self, role: impl Into<RoleId>) -> Self {
        self.requirements.push(role.into());
        self
    }

    /// Add a permitted role
    pub fn permits(mut self, role: impl Into<RoleId>) -> Self {
        self.permits.push(role.into());
        self
    }

    /// Edge targets for a relation
    pub fn edges(&self, relation: Relation) -> &[RoleId] {
        match relation {
            Relation::Inherits => &self.inheritance,
            Relation::Requires => &self.requirements,
            Relation::Permits => &self.permits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ref_equality_ignores_name() {
        let a = RoleRef::new("r1", "Payroll Admin");
        let b = RoleRef::new("r1", "Payroll Administrator");
        let c = RoleRef::new("r2", "Payroll Admin");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_name_fallback() {
        let named = RoleRef::new("r1", "Auditor");
        let unnamed = RoleRef::new("r2", "");

        assert_eq!(named.display_name(), "Auditor");
        assert_eq!(unnamed.display_name(), "r2");
    }

    #[test]
    fn test_definition_builder() {
        let def = RoleDefinition::new("manager", "Manager")
            .inherits("employee")
            .requires("badge")
            .permits("expense-approver");

        assert_eq!(def.edges(Relation::Inherits), &[RoleId::from("employee")]);
        assert_eq!(def.edges(Relation::Requires), &[RoleId::from("badge")]);
        assert_eq!(def.edges(Relation::Permits), &[RoleId::from("expense-approver")]);
    }

    #[test]
    fn test_definition_deserialize_defaults() {
        let def: RoleDefinition =
            serde_json::from_str(r#"{"id": "r1", "name": "Reader"}"#).unwrap();

        assert_eq!(def.id, RoleId::from("r1"));
        assert!(def.inheritance.is_empty());
        assert!(def.requirements.is_empty());
        assert!(def.permits.is_empty());
    }
}
