//! Identity audit: relationship analysis, soft-permit promotion and
//! SOD evaluation for one identity refresh

use crate::assignment::{AssignmentSource, AssignmentState, RoleAssignment};
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::relationships::{RelationshipAnalyzer, RelationshipSummary, RoleRelationships};
use crate::snapshot::IdentitySnapshot;
use crate::sod::{sod_score, SodPolicy, SodViolation};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rolegraph_core::{RoleGraph, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of auditing one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAudit {
    pub identity: String,

    /// Relationship maps by role id, including missing requirements
    pub relationships: RelationshipSummary,

    /// Soft permits added to the ledger
    pub promoted_permits: usize,

    /// Soft permits removed from the ledger by demotion
    pub dropped_permits: usize,

    pub violations: Vec<SodViolation>,

    /// Sum of violated constraint weights
    pub sod_score: i64,

    /// Set when the audit failed; the other fields are then empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IdentityAudit {
    fn failed(identity: &str, error: String) -> Self {
        Self {
            identity: identity.to_string(),
            relationships: RelationshipSummary::default(),
            promoted_permits: 0,
            dropped_permits: 0,
            violations: Vec::new(),
            sod_score: 0,
            error: Some(error),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.violations.is_empty() && self.relationships.missing.is_empty()
    }
}

/// Runs identity audits against one role graph and policy set
///
/// The graph and policies are shared read-only; each audit owns the
/// identity it works on.
#[derive(Debug, Clone)]
pub struct RoleAuditor<'g> {
    graph: &'g RoleGraph,
    policies: &'g [SodPolicy],
    config: AnalyzerConfig,
}

impl<'g> RoleAuditor<'g> {
    pub fn new(graph: &'g RoleGraph, policies: &'g [SodPolicy], config: AnalyzerConfig) -> Self {
        Self {
            graph,
            policies,
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyzer(&self) -> RelationshipAnalyzer<'g> {
        RelationshipAnalyzer::new(self.graph, self.config.limits)
    }

    /// Audit an identity as of now
    pub fn audit(&self, identity: &mut IdentitySnapshot) -> Result<IdentityAudit> {
        self.audit_at(identity, Utc::now())
    }

    /// Audit an identity as of `now`
    ///
    /// When soft-permit promotion or demotion is enabled the identity's
    /// ledger is updated in place. Demotion wins when both are set.
    pub fn audit_at(&self, identity: &mut IdentitySnapshot, now: DateTime<Utc>) -> Result<IdentityAudit> {
        let name = identity.ledger.identity.clone();
        let assigned = identity.ledger.assigned_role_ids(now);
        let relationships = self.analyzer().analyze(&assigned, &identity.detected)?;

        let (promoted, dropped) = if self.config.demote_soft_permits {
            let dropped = identity
                .ledger
                .demote_soft_permits(&self.config.system_assigner);
            if dropped > 0 {
                info!(identity = %name, dropped, "Demoted soft permits");
            }
            (0, dropped)
        } else if self.config.promote_soft_permits {
            (self.promote_soft_permits(identity, &relationships, now), 0)
        } else {
            (0, 0)
        };

        // SOD matches by stable id, so roles missing from the graph still count
        let effective: HashSet<RoleId> = assigned
            .iter()
            .chain(identity.detected.iter())
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();
        let violations: Vec<SodViolation> = self
            .policies
            .iter()
            .flat_map(|policy| policy.evaluate(&name, &effective))
            .collect();
        let score = sod_score(&violations);

        debug!(
            identity = %name,
            assigned = assigned.len(),
            detected = identity.detected.len(),
            violations = violations.len(),
            "Audited identity"
        );

        Ok(IdentityAudit {
            identity: name,
            relationships: relationships.summary()?,
            promoted_permits: promoted,
            dropped_permits: dropped,
            violations,
            sod_score: score,
            error: None,
        })
    }

    /// Audit many identities in parallel as of now
    ///
    /// A failed audit is reported in its entry's `error` field and does not
    /// affect the others. Results keep input order.
    pub fn audit_batch(&self, identities: &mut [IdentitySnapshot]) -> Vec<IdentityAudit> {
        let now = Utc::now();
        let start = Instant::now();

        info!(identity_count = identities.len(), "Starting identity audit batch");

        let audits: Vec<IdentityAudit> = identities
            .par_iter_mut()
            .map(|identity| {
                self.audit_at(identity, now).unwrap_or_else(|e| {
                    warn!(identity = %identity.ledger.identity, error = %e, "Identity audit failed");
                    IdentityAudit::failed(&identity.ledger.identity, e.to_string())
                })
            })
            .collect();

        info!(
            identity_count = audits.len(),
            violations = audits.iter().map(|a| a.violations.len()).sum::<usize>(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completed identity audit batch"
        );

        audits
    }

    /// Promote permitted detected roles into the ledger
    ///
    /// Every detected role an active assignment permits becomes a system
    /// permit on that assignment unless an equivalent permit is already
    /// recorded. Nothing is removed; persisted permits outlive detection
    /// until demoted.
    fn promote_soft_permits(
        &self,
        identity: &mut IdentitySnapshot,
        relationships: &RoleRelationships<'_>,
        now: DateTime<Utc>,
    ) -> usize {
        let system_assigner = self.config.system_assigner.as_str();
        let mut promoted = 0;

        for assignment in identity
            .ledger
            .assignments
            .iter_mut()
            .filter(|a| a.is_active_at(now))
        {
            let Some(role) = assignment.role_id.as_ref().and_then(|id| self.graph.lookup(id)) else {
                continue;
            };

            for detected in relationships.permitted_roles(role).unwrap_or_default() {
                if *detected == role {
                    continue;
                }
                let mut permit = RoleAssignment::new(
                    self.graph.id(*detected).clone(),
                    self.graph.name(*detected),
                )
                .with_assigner(system_assigner)
                .with_source(AssignmentSource::Task);
                permit.date = now;
                permit.state = AssignmentState::Assigned;
                if assignment.add_permitted_role(permit) {
                    promoted += 1;
                }
            }
        }

        if promoted > 0 {
            info!(
                identity = %identity.ledger.identity,
                promoted,
                "Promoted soft permits"
            );
        }
        promoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::RoleAssignmentLedger;
    use crate::config::SYSTEM_ASSIGNER;
    use rolegraph_core::{RoleDefinition, RoleGraphBuilder, RoleRef};

    fn graph() -> RoleGraph {
        let mut builder = RoleGraphBuilder::new();
        builder
            .add_roles(vec![
                RoleDefinition::new("employee", "Employee").requires("badge"),
                RoleDefinition::new("manager", "Manager")
                    .inherits("employee")
                    .permits("approver"),
                RoleDefinition::new("badge", "Badge Access"),
                RoleDefinition::new("approver", "Approver"),
                RoleDefinition::new("clerk", "Clerk"),
            ])
            .unwrap();
        builder.build().unwrap()
    }

    fn policies() -> Vec<SodPolicy> {
        vec![SodPolicy::new("Finance").with_constraint(
            crate::sod::SodConstraint::new("approve-vs-clerk")
                .left(RoleRef::new("approver", "Approver"))
                .right(RoleRef::new("clerk", "Clerk"))
                .with_weight(25),
        )]
    }

    fn promoting() -> AnalyzerConfig {
        AnalyzerConfig {
            promote_soft_permits: true,
            ..AnalyzerConfig::default()
        }
    }

    fn identity(name: &str, detected: &[&str]) -> IdentitySnapshot {
        let mut ledger = RoleAssignmentLedger::new(name);
        let mut manager = RoleAssignment::new("manager", "Manager").with_assigner("hr-admin");
        manager.assign().unwrap();
        ledger.add(manager).unwrap();
        IdentitySnapshot::new(ledger, detected.iter().map(|r| RoleId::from(*r)).collect())
    }

    #[test]
    fn test_audit_promotes_soft_permits() {
        let graph = graph();
        let policies = policies();
        let auditor = RoleAuditor::new(&graph, &policies, promoting());
        let mut alice = identity("alice", &["approver", "badge", "manager"]);

        let audit = auditor.audit(&mut alice).unwrap();

        assert_eq!(audit.promoted_permits, 2);
        assert_eq!(audit.dropped_permits, 0);
        let permits = &alice.ledger.assignments[0].permits;
        assert_eq!(permits.len(), 2);
        assert!(permits.iter().all(|p| p.is_promoted_soft_permit()));
        assert_eq!(permits[0].role_id, Some(RoleId::from("approver")));
        assert!(audit.violations.is_empty());
        assert!(audit.is_clean());

        // a second pass changes nothing
        let again = auditor.audit(&mut alice).unwrap();
        assert_eq!((again.promoted_permits, again.dropped_permits), (0, 0));
    }

    #[test]
    fn test_default_audit_leaves_ledger_alone() {
        let graph = graph();
        let policies = policies();
        let auditor = RoleAuditor::new(&graph, &policies, AnalyzerConfig::default());
        let mut alice = identity("alice", &["approver"]);

        let audit = auditor.audit(&mut alice).unwrap();

        assert_eq!((audit.promoted_permits, audit.dropped_permits), (0, 0));
        assert!(alice.ledger.assignments[0].permits.is_empty());
    }

    #[test]
    fn test_promotion_keeps_persisted_permits() {
        let graph = graph();
        let policies = policies();
        let auditor = RoleAuditor::new(&graph, &policies, promoting());
        let mut alice = identity("alice", &["approver"]);
        auditor.audit(&mut alice).unwrap();
        alice.ledger.assignments[0].add_permitted_role(
            RoleAssignment::new("badge", "Badge Access").with_assigner(SYSTEM_ASSIGNER),
        );

        // nothing detected any more; persisted permits stay until demoted
        alice.detected.clear();
        let audit = auditor.audit(&mut alice).unwrap();

        assert_eq!((audit.promoted_permits, audit.dropped_permits), (0, 0));
        let permits = &alice.ledger.assignments[0].permits;
        assert_eq!(permits.len(), 2);
        assert_eq!(permits[0].role_id, Some(RoleId::from("approver")));
        assert_eq!(permits[1].role_id, Some(RoleId::from("badge")));
    }

    #[test]
    fn test_sod_counts_roles_missing_from_graph() {
        let graph = graph();
        let policies = vec![SodPolicy::new("Legacy").with_constraint(
            crate::sod::SodConstraint::new("manager-vs-mainframe")
                .left(RoleRef::new("manager", "Manager"))
                .right(RoleRef::new("mainframe-admin", "Mainframe Admin"))
                .with_weight(10),
        )];
        let auditor = RoleAuditor::new(&graph, &policies, AnalyzerConfig::default());
        let mut alice = identity("alice", &["mainframe-admin"]);

        let audit = auditor.audit(&mut alice).unwrap();

        assert_eq!(audit.violations.len(), 1);
        assert_eq!(audit.sod_score, 10);
        assert!(audit.relationships.permitting.is_empty());
    }

    #[test]
    fn test_audit_demotes_soft_permits() {
        let graph = graph();
        let policies = policies();
        let promoter = RoleAuditor::new(&graph, &policies, promoting());
        let mut alice = identity("alice", &["approver", "badge"]);
        promoter.audit(&mut alice).unwrap();
        alice.ledger.assignments[0]
            .add_permitted_role(RoleAssignment::new("clerk", "Clerk").with_assigner("hr-admin"));

        let config = AnalyzerConfig {
            demote_soft_permits: true,
            ..promoting()
        };
        let demoting = RoleAuditor::new(&graph, &policies, config);
        let audit = demoting.audit(&mut alice).unwrap();

        assert_eq!((audit.promoted_permits, audit.dropped_permits), (0, 2));
        let permits = &alice.ledger.assignments[0].permits;
        assert_eq!(permits.len(), 1);
        assert_eq!(permits[0].role_id, Some(RoleId::from("clerk")));
    }

    #[test]
    fn test_audit_reports_violations_and_missing() {
        let graph = graph();
        let policies = policies();
        let auditor = RoleAuditor::new(&graph, &policies, AnalyzerConfig::default());
        let mut bob = identity("bob", &["approver", "clerk"]);

        let audit = auditor.audit(&mut bob).unwrap();

        assert_eq!(audit.violations.len(), 1);
        assert_eq!(audit.sod_score, 25);
        assert_eq!(audit.promoted_permits, 0);
        assert!(bob.ledger.assignments[0].permits.is_empty());
        assert_eq!(
            audit.relationships.missing[&RoleId::from("manager")],
            vec![RoleId::from("badge")]
        );
        assert!(!audit.is_clean());
    }

    #[test]
    fn test_audit_batch_isolates_failures() {
        let mut builder = RoleGraphBuilder::new();
        builder
            .add_roles(vec![
                RoleDefinition::new("manager", "Manager").inherits("lead"),
                RoleDefinition::new("lead", "Lead").inherits("manager"),
                RoleDefinition::new("clerk", "Clerk"),
            ])
            .unwrap();
        let cyclic = builder.build().unwrap();
        let policies = policies();
        let auditor = RoleAuditor::new(&cyclic, &policies, AnalyzerConfig::default());

        let mut ok = RoleAssignmentLedger::new("carol");
        let mut clerk = RoleAssignment::new("clerk", "Clerk");
        clerk.assign().unwrap();
        ok.add(clerk).unwrap();

        let mut identities = vec![
            identity("alice", &[]),
            IdentitySnapshot::new(ok, vec![RoleId::from("clerk")]),
        ];
        let audits = auditor.audit_batch(&mut identities);

        assert_eq!(audits.len(), 2);
        assert_eq!(audits[0].identity, "alice");
        assert!(audits[0].error.as_deref().is_some_and(|e| e.contains("Circular dependency")));
        assert_eq!(audits[1].identity, "carol");
        assert!(audits[1].error.is_none());
    }
}
