//! Error types for relationship analysis, SOD evaluation and the assignment ledger

use rolegraph_core::{GraphError, RoleId};
use thiserror::Error;

/// Governance errors
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Required-role data was queried for a role the analysis never covered
    #[error("Role not analyzed: {0}")]
    NotAnalyzed(RoleId),

    /// Role graph construction or traversal failed
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Assignment lifecycle transition not allowed
    #[error("Invalid transition for assignment {assignment_id}: {from} -> {to}")]
    InvalidTransition {
        assignment_id: String,
        from: String,
        to: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GovernanceError {
    /// Create an invalid input error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        GovernanceError::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        GovernanceError::Configuration(msg.into())
    }
}

/// Result type for governance operations
pub type Result<T> = std::result::Result<T, GovernanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GovernanceError::NotAnalyzed(RoleId::from("manager"));
        assert_eq!(err.to_string(), "Role not analyzed: manager");

        let err: GovernanceError = GraphError::CircularDependency("a -> a".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Graph error: Circular dependency detected: a -> a"
        );
    }

    #[test]
    fn test_error_construction() {
        assert!(matches!(
            GovernanceError::invalid("bad"),
            GovernanceError::InvalidInput(_)
        ));
        assert!(matches!(
            GovernanceError::configuration("bad"),
            GovernanceError::Configuration(_)
        ));
    }
}
