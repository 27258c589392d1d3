//! Error types for role graph construction and traversal

use crate::types::RoleId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Role graph errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Circular relationship detected while walking the graph
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// Role identifier is duplicated
    #[error("Duplicate role id: {0}")]
    DuplicateRole(RoleId),

    /// Invalid role definition
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// An edge references a role that was never defined
    #[error("Role '{referenced_by}' references unknown role '{role}'")]
    UnknownRole { role: RoleId, referenced_by: RoleId },

    /// Traversal went deeper than the configured limit
    #[error("Traversal depth exceeded {max_depth} at role '{role}'")]
    DepthExceeded { role: RoleId, max_depth: usize },
}

impl GraphError {
    /// Create a circular dependency error from the roles on the offending path
    pub fn cycle<'a, I>(path: I) -> Self
    where
        I: IntoIterator<Item = &'a RoleId>,
    {
        let joined = path
            .into_iter()
            .map(RoleId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ");
        GraphError::CircularDependency(joined)
    }

    /// Create an invalid role error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        GraphError::InvalidRole(msg.into())
    }
}
