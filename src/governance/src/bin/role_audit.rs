//! # Role Audit
//!
//! Audits every identity in a snapshot file and prints a JSON report.
//!
//! ## Usage
//!
//! ```text
//! role-audit <snapshot.json>
//! ```
//!
//! ## Configuration
//!
//! Environment variables:
//! - `ROLEGRAPH_SNAPSHOT` - snapshot path when no argument is given
//! - `ROLEGRAPH_CYCLE_POLICY` - `reject` or `tolerate` (default: reject)
//! - `ROLEGRAPH_MAX_DEPTH` - maximum walk depth (default: 64)
//! - `ROLEGRAPH_SYSTEM_ASSIGNER` - assigner of promoted soft permits (default: System)
//! - `ROLEGRAPH_PROMOTE_SOFT_PERMITS` - promote permitted detected roles (default: false)
//! - `ROLEGRAPH_DEMOTE_SOFT_PERMITS` - strip soft permits instead (default: false)
//! - `RUST_LOG` - Log level (default: info)

use anyhow::{Context, Result};
use rolegraph_governance::{AnalyzerConfig, IdentityAudit, RoleAuditor, Snapshot};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_SNAPSHOT: &str = "ROLEGRAPH_SNAPSHOT";

/// Report printed to stdout
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuditReport {
    version: &'static str,
    identities: usize,
    violations: usize,
    failures: usize,
    audits: Vec<IdentityAudit>,
}

fn snapshot_path() -> Result<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(ENV_SNAPSHOT).map(PathBuf::from))
        .with_context(|| format!("usage: role-audit <snapshot.json> (or set {})", ENV_SNAPSHOT))
}

fn main() -> Result<()> {
    // Logs go to stderr so the report on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting role audit v{}", rolegraph_governance::VERSION);

    let config = AnalyzerConfig::from_env().context("invalid configuration")?;
    info!("Configuration:");
    info!("  Cycle policy: {}", config.limits.cycle_policy);
    info!("  Max depth: {}", config.limits.max_depth);
    info!("  System assigner: {}", config.system_assigner);
    info!("  Promote soft permits: {}", config.promote_soft_permits);
    info!("  Demote soft permits: {}", config.demote_soft_permits);

    let path = snapshot_path()?;
    let mut snapshot = Snapshot::load(&path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    let graph = snapshot
        .build_graph(&config)
        .context("failed to build role graph")?;

    let auditor = RoleAuditor::new(&graph, &snapshot.policies, config);
    let audits = auditor.audit_batch(&mut snapshot.identities);

    let report = AuditReport {
        version: rolegraph_governance::VERSION,
        identities: audits.len(),
        violations: audits.iter().map(|a| a.violations.len()).sum(),
        failures: audits.iter().filter(|a| a.error.is_some()).count(),
        audits,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );
    Ok(())
}
