//! Analyzer configuration
//!
//! Environment variables:
//! - `ROLEGRAPH_CYCLE_POLICY` - `reject` or `tolerate` (default: reject)
//! - `ROLEGRAPH_MAX_DEPTH` - maximum walk depth (default: 64)
//! - `ROLEGRAPH_SYSTEM_ASSIGNER` - assigner recorded on promoted soft permits (default: System)
//! - `ROLEGRAPH_PROMOTE_SOFT_PERMITS` - promote permitted detected roles during audits (default: false)
//! - `ROLEGRAPH_DEMOTE_SOFT_PERMITS` - strip soft permits during audits, overrides promotion (default: false)

use crate::error::{GovernanceError, Result};
use rolegraph_core::{CyclePolicy, TraversalLimits};
use serde::{Deserialize, Serialize};

/// Reserved assigner name marking system-inferred permits
pub const SYSTEM_ASSIGNER: &str = "System";

pub const ENV_CYCLE_POLICY: &str = "ROLEGRAPH_CYCLE_POLICY";
pub const ENV_MAX_DEPTH: &str = "ROLEGRAPH_MAX_DEPTH";
pub const ENV_SYSTEM_ASSIGNER: &str = "ROLEGRAPH_SYSTEM_ASSIGNER";
pub const ENV_PROMOTE_SOFT_PERMITS: &str = "ROLEGRAPH_PROMOTE_SOFT_PERMITS";
pub const ENV_DEMOTE_SOFT_PERMITS: &str = "ROLEGRAPH_DEMOTE_SOFT_PERMITS";

/// Relationship analysis and audit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Bounds for every graph walk
    #[serde(default)]
    pub limits: TraversalLimits,

    /// Assigner recorded on promoted soft permits
    #[serde(default = "default_system_assigner")]
    pub system_assigner: String,

    /// Promote permitted detected roles into the ledger during audits
    #[serde(default)]
    pub promote_soft_permits: bool,

    /// Strip every soft permit during audits; wins over promotion
    #[serde(default)]
    pub demote_soft_permits: bool,
}

fn default_system_assigner() -> String {
    SYSTEM_ASSIGNER.to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            limits: TraversalLimits::default(),
            system_assigner: default_system_assigner(),
            promote_soft_permits: false,
            demote_soft_permits: false,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    ///
    /// Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(policy) = lookup(ENV_CYCLE_POLICY) {
            config.limits.cycle_policy = policy
                .parse::<CyclePolicy>()
                .map_err(|e| GovernanceError::configuration(format!("{}: {}", ENV_CYCLE_POLICY, e)))?;
        }

        if let Some(depth) = lookup(ENV_MAX_DEPTH) {
            let max_depth = depth.trim().parse::<usize>().map_err(|e| {
                GovernanceError::configuration(format!("{}: {}", ENV_MAX_DEPTH, e))
            })?;
            if max_depth == 0 {
                return Err(GovernanceError::configuration(format!(
                    "{} must be greater than zero",
                    ENV_MAX_DEPTH
                )));
            }
            config.limits.max_depth = max_depth;
        }

        if let Some(assigner) = lookup(ENV_SYSTEM_ASSIGNER) {
            if assigner.trim().is_empty() {
                return Err(GovernanceError::configuration(format!(
                    "{} cannot be empty",
                    ENV_SYSTEM_ASSIGNER
                )));
            }
            config.system_assigner = assigner.trim().to_string();
        }

        if let Some(flag) = lookup(ENV_PROMOTE_SOFT_PERMITS) {
            config.promote_soft_permits = parse_flag(ENV_PROMOTE_SOFT_PERMITS, &flag)?;
        }

        if let Some(flag) = lookup(ENV_DEMOTE_SOFT_PERMITS) {
            config.demote_soft_permits = parse_flag(ENV_DEMOTE_SOFT_PERMITS, &flag)?;
        }

        Ok(config)
    }

    /// Use the given cycle policy
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.limits.cycle_policy = policy;
        self
    }

    /// Use the given maximum walk depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.limits.max_depth = max_depth;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GovernanceError::configuration(format!(
            "{}: expected true or false, got '{}'",
            key, value
        ))),
    }
}
