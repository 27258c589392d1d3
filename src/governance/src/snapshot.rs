//! Role model and identity snapshot loading

use crate::assignment::RoleAssignmentLedger;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::sod::SodPolicy;
use rolegraph_core::{CyclePolicy, Relation, RoleDefinition, RoleGraph, RoleGraphBuilder, RoleId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// One identity's ledger plus the roles detected for it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySnapshot {
    #[serde(flatten)]
    pub ledger: RoleAssignmentLedger,

    /// Roles matched from the identity's entitlements
    #[serde(default)]
    pub detected: Vec<RoleId>,
}

impl IdentitySnapshot {
    pub fn new(ledger: RoleAssignmentLedger, detected: Vec<RoleId>) -> Self {
        Self { ledger, detected }
    }

    pub fn name(&self) -> &str {
        &self.ledger.identity
    }
}

/// Role model, identities and SOD policies read together
///
/// ```json
/// {
///   "roles": [{"id": "manager", "name": "Manager", "inheritance": ["employee"]}],
///   "identities": [{"identity": "alice", "assignments": [...], "detected": ["badge"]}],
///   "policies": [{"name": "Finance", "constraints": [...]}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,

    #[serde(default)]
    pub identities: Vec<IdentitySnapshot>,

    #[serde(default)]
    pub policies: Vec<SodPolicy>,
}

impl Snapshot {
    /// Read a snapshot from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            roles = snapshot.roles.len(),
            identities = snapshot.identities.len(),
            policies = snapshot.policies.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the role graph
    ///
    /// Under [`CyclePolicy::Reject`] inheritance and requirement cycles are
    /// reported here rather than during the first audit that reaches them.
    /// Permit cycles are allowed; permits are never followed transitively.
    pub fn build_graph(&self, config: &AnalyzerConfig) -> Result<RoleGraph> {
        let mut builder = RoleGraphBuilder::new();
        builder.add_roles(self.roles.iter().cloned())?;
        let graph = builder.build()?;

        if config.limits.cycle_policy == CyclePolicy::Reject {
            graph.detect_cycles(&[Relation::Inherits, Relation::Requires])?;
        }
        Ok(graph)
    }
}
