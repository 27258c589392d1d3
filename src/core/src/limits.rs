//! Traversal limits applied to every graph walk

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default maximum walk depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What a walk does when an edge leads back onto its own path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Fail with [`GraphError::CircularDependency`](crate::GraphError::CircularDependency)
    #[default]
    Reject,
    /// Skip the edge and keep walking
    Tolerate,
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePolicy::Reject => f.write_str("reject"),
            CyclePolicy::Tolerate => f.write_str("tolerate"),
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(CyclePolicy::Reject),
            "tolerate" => Ok(CyclePolicy::Tolerate),
            other => Err(format!("unknown cycle policy '{}'", other)),
        }
    }
}

/// Bounds for a single walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraversalLimits {
    /// Behaviour on back edges
    #[serde(default)]
    pub cycle_policy: CyclePolicy,

    /// Maximum number of edges between the start role and any visited role
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl TraversalLimits {
    pub fn new(cycle_policy: CyclePolicy, max_depth: usize) -> Self {
        Self {
            cycle_policy,
            max_depth,
        }
    }

    /// Limits that skip back edges instead of failing
    pub fn tolerant() -> Self {
        Self {
            cycle_policy: CyclePolicy::Tolerate,
            ..Self::default()
        }
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::Reject,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
