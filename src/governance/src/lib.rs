//! # Rolegraph Governance
//!
//! Role relationship analysis, segregation-of-duty evaluation and the role
//! assignment ledger, built on the [`rolegraph_core`] role graph.
//!
//! ## Features
//!
//! - **Relationship analysis**: which assigned roles permit which detected
//!   roles, what each assigned role requires, and what is missing
//! - **SOD evaluation**: left/right constraint matching by stable role id
//! - **Assignment ledger**: assignment lifecycle, account targets and
//!   nested permits
//! - **Identity audits**: soft-permit reconciliation and parallel batches
//!
//! ## Example
//!
//! ```rust
//! use rolegraph_core::{RoleDefinition, RoleGraphBuilder, RoleId, RoleRef};
//! use rolegraph_governance::{
//!     AnalyzerConfig, IdentitySnapshot, RoleAssignment, RoleAssignmentLedger, RoleAuditor,
//!     SodConstraint, SodPolicy,
//! };
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RoleGraphBuilder::new();
//! builder.add_role(RoleDefinition::new("approver", "Approver"))?;
//! builder.add_role(RoleDefinition::new("clerk", "Clerk"))?;
//! let graph = builder.build()?;
//!
//! let policies = vec![SodPolicy::new("Finance").with_constraint(
//!     SodConstraint::new("approve-vs-clerk")
//!         .left(RoleRef::new("approver", "Approver"))
//!         .right(RoleRef::new("clerk", "Clerk")),
//! )];
//!
//! let mut ledger = RoleAssignmentLedger::new("alice");
//! let mut approver = RoleAssignment::new("approver", "Approver");
//! approver.assign()?;
//! ledger.add(approver)?;
//! let mut alice = IdentitySnapshot::new(ledger, vec![RoleId::from("clerk")]);
//!
//! let auditor = RoleAuditor::new(&graph, &policies, AnalyzerConfig::default());
//! let audit = auditor.audit(&mut alice)?;
//! assert_eq!(audit.violations.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod auditor;
pub mod config;
pub mod error;
pub mod relationships;
pub mod snapshot;
pub mod sod;

// Re-export commonly used types
pub use assignment::{AssignmentSource, AssignmentState, RoleAssignment, RoleAssignmentLedger, RoleTarget};
pub use auditor::{IdentityAudit, RoleAuditor};
pub use config::{AnalyzerConfig, SYSTEM_ASSIGNER};
pub use error::{GovernanceError, Result};
pub use relationships::{RelationshipAnalyzer, RelationshipSummary, RoleRelationships};
pub use snapshot::{IdentitySnapshot, Snapshot};
pub use sod::{SodConstraint, SodPolicy, SodViolation};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
