//! Role assignment record

use super::RoleTarget;
use crate::config::SYSTEM_ASSIGNER;
use crate::error::{GovernanceError, Result};
use chrono::{DateTime, Utc};
use rolegraph_core::RoleId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How an assignment decision was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    #[default]
    Manual,
    Rule,
    Request,
    Certification,
    Batch,
    /// Background task, such as soft-permit promotion
    Task,
}

impl fmt::Display for AssignmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Rule => write!(f, "rule"),
            Self::Request => write!(f, "request"),
            Self::Certification => write!(f, "certification"),
            Self::Batch => write!(f, "batch"),
            Self::Task => write!(f, "task"),
        }
    }
}

/// Assignment lifecycle state
///
/// `Proposed -> Assigned -> Retracted`. A proposal may also be retracted
/// before it is assigned. Retracted is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentState {
    Proposed,
    Assigned,
    Retracted,
}

impl AssignmentState {
    /// Whether the lifecycle allows moving to `next`
    pub fn can_transition_to(self, next: AssignmentState) -> bool {
        matches!(
            (self, next),
            (Self::Proposed, Self::Assigned)
                | (Self::Proposed, Self::Retracted)
                | (Self::Assigned, Self::Retracted)
        )
    }
}

impl fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proposed => write!(f, "proposed"),
            Self::Assigned => write!(f, "assigned"),
            Self::Retracted => write!(f, "retracted"),
        }
    }
}

fn generate_assignment_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn persisted_state() -> AssignmentState {
    AssignmentState::Assigned
}

/// One role assignment decision
///
/// Permitted roles are nested records of the same shape. Records read
/// without an assignment id get a fresh one, and records read without a
/// state are taken as assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    #[serde(default = "generate_assignment_id")]
    pub assignment_id: String,

    /// Stable role id; absent for records built before the role was persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,

    /// Cached role name
    #[serde(default)]
    pub role_name: String,

    /// Who made the decision; `None` for system decisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigner: Option<String>,

    #[serde(default)]
    pub source: AssignmentSource,

    /// When the decision was made
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    #[serde(default = "persisted_state")]
    pub state: AssignmentState,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<RoleTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permits: Vec<RoleAssignment>,
}

impl RoleAssignment {
    /// Propose a role for assignment
    pub fn new(role_id: impl Into<RoleId>, role_name: impl Into<String>) -> Self {
        Self {
            assignment_id: generate_assignment_id(),
            role_id: Some(role_id.into()),
            role_name: role_name.into(),
            assigner: None,
            source: AssignmentSource::default(),
            date: Utc::now(),
            start_date: None,
            end_date: None,
            comments: None,
            state: AssignmentState::Proposed,
            targets: Vec::new(),
            permits: Vec::new(),
        }
    }

    /// Propose a role known only by name
    pub fn unpersisted(role_name: impl Into<String>) -> Self {
        Self {
            role_id: None,
            ..Self::new("", role_name)
        }
    }

    pub fn with_assigner(mut self, assigner: impl Into<String>) -> Self {
        self.assigner = Some(assigner.into());
        self
    }

    pub fn with_source(mut self, source: AssignmentSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Move a proposal to assigned
    pub fn assign(&mut self) -> Result<()> {
        self.transition(AssignmentState::Assigned)
    }

    /// Retract a proposed or assigned role
    pub fn retract(&mut self) -> Result<()> {
        self.transition(AssignmentState::Retracted)
    }

    fn transition(&mut self, next: AssignmentState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(GovernanceError::InvalidTransition {
                assignment_id: self.assignment_id.clone(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Whether the start date lies after `now`
    pub fn is_future_assignment_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date.is_some_and(|start| start > now)
    }

    /// Whether the start date lies in the future
    pub fn is_future_assignment(&self) -> bool {
        self.is_future_assignment_at(Utc::now())
    }

    /// Whether the end date has passed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_some_and(|end| end <= now)
    }

    /// Assigned, started and not yet ended at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state == AssignmentState::Assigned
            && !self.is_future_assignment_at(now)
            && !self.is_expired_at(now)
    }

    /// Whether this permit was promoted by the system rather than a person
    pub fn is_promoted_soft_permit(&self) -> bool {
        self.is_promoted_by(SYSTEM_ASSIGNER)
    }

    /// Like [`is_promoted_soft_permit`](Self::is_promoted_soft_permit) with
    /// a configured system assigner name
    pub fn is_promoted_by(&self, system_assigner: &str) -> bool {
        match &self.assigner {
            None => true,
            Some(assigner) => assigner == system_assigner,
        }
    }

    // =========================================================================
    // Targets
    // =========================================================================

    /// Whether an existing target binds the same account as `candidate`
    pub fn has_matching_role_target(&self, candidate: &RoleTarget) -> bool {
        self.targets.iter().any(|target| target.matches(candidate))
    }

    /// Add a target unless the account is already bound
    ///
    /// Returns `true` if the target was added.
    pub fn add_role_target(&mut self, target: RoleTarget) -> bool {
        if self.has_matching_role_target(&target) {
            return false;
        }
        self.targets.push(target);
        true
    }

    // =========================================================================
    // Permits
    // =========================================================================

    /// Add a permitted role unless an equivalent entry exists
    ///
    /// Entries are equivalent when their role ids are equal. When either
    /// side has no role id, they are equivalent when their names are.
    /// Returns `true` if the permit was added.
    pub fn add_permitted_role(&mut self, permit: RoleAssignment) -> bool {
        if self
            .find_permit(permit.role_id.as_ref(), Some(permit.role_name.as_str()))
            .is_some()
        {
            return false;
        }
        self.permits.push(permit);
        true
    }

    /// Remove and return the permitted role matching `id` or `name`
    pub fn remove_permitted_role(
        &mut self,
        id: Option<&RoleId>,
        name: Option<&str>,
    ) -> Option<RoleAssignment> {
        let (position, _) = self.find_permit(id, name)?;
        Some(self.permits.remove(position))
    }

    /// Find a permitted role
    ///
    /// A role id match wins over a name match, even when `name` matches
    /// another entry. Names are only compared when the query or the entry
    /// has no role id.
    pub fn permitted_role(&self, id: Option<&RoleId>, name: Option<&str>) -> Option<&RoleAssignment> {
        let (position, _) = self.find_permit(id, name)?;
        self.permits.get(position)
    }

    /// Find a permitted role and refresh its cached name
    ///
    /// Same lookup as [`permitted_role`](Self::permitted_role). When the
    /// entry matched by role id and `name` is given, the entry takes that
    /// name, so renamed roles are picked up on read.
    pub fn resolve_permitted_role(
        &mut self,
        id: Option<&RoleId>,
        name: Option<&str>,
    ) -> Option<&RoleAssignment> {
        let (position, by_id) = self.find_permit(id, name)?;
        let permit = &mut self.permits[position];
        if let (true, Some(name)) = (by_id, name) {
            if permit.role_name != name {
                permit.role_name = name.to_string();
            }
        }
        Some(&*permit)
    }

    /// Position of the matching permit and whether it matched by id
    fn find_permit(&self, id: Option<&RoleId>, name: Option<&str>) -> Option<(usize, bool)> {
        let id = id.filter(|id| !id.is_empty());
        let name = name.filter(|name| !name.is_empty());

        if let Some(id) = id {
            let found = self
                .permits
                .iter()
                .position(|permit| permit.role_id.as_ref() == Some(id));
            if let Some(position) = found {
                return Some((position, true));
            }
        }

        let name = name?;
        self.permits
            .iter()
            .position(|permit| {
                let either_unidentified = id.is_none() || !permit.has_role_id();
                either_unidentified && permit.role_name == name
            })
            .map(|position| (position, false))
    }

    fn has_role_id(&self) -> bool {
        self.role_id.as_ref().is_some_and(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_lifecycle() {
        let mut assignment = RoleAssignment::new("manager", "Manager");
        assert_eq!(assignment.state, AssignmentState::Proposed);

        assignment.assign().unwrap();
        assert_eq!(assignment.state, AssignmentState::Assigned);

        assignment.retract().unwrap();
        assert_eq!(assignment.state, AssignmentState::Retracted);

        match assignment.assign() {
            Err(GovernanceError::InvalidTransition { from, to, .. }) => {
                assert_eq!(from, "retracted");
                assert_eq!(to, "assigned");
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_retract_proposal() {
        let mut assignment = RoleAssignment::new("manager", "Manager");
        assignment.retract().unwrap();
        assert!(assignment.retract().is_err());
    }

    #[test]
    fn test_assignment_ids_are_unique() {
        let a = RoleAssignment::new("manager", "Manager");
        let b = RoleAssignment::new("manager", "Manager");

        assert_ne!(a.assignment_id, b.assignment_id);
        assert_eq!(a.assignment_id.len(), 32);
    }

    #[test]
    fn test_future_assignment() {
        let now = Utc::now();
        let future = RoleAssignment::new("manager", "Manager").with_start_date(now + Duration::days(1));
        let started = RoleAssignment::new("manager", "Manager").with_start_date(now - Duration::days(1));
        let immediate = RoleAssignment::new("manager", "Manager");

        assert!(future.is_future_assignment_at(now));
        assert!(future.is_future_assignment());
        assert!(!started.is_future_assignment_at(now));
        assert!(!immediate.is_future_assignment_at(now));
        // start exactly now is not in the future
        let exact = RoleAssignment::new("manager", "Manager").with_start_date(now);
        assert!(!exact.is_future_assignment_at(now));
    }

    #[test]
    fn test_active_window() {
        let now = Utc::now();
        let mut assignment = RoleAssignment::new("manager", "Manager").with_end_date(now + Duration::hours(1));
        assert!(!assignment.is_active_at(now));

        assignment.assign().unwrap();
        assert!(assignment.is_active_at(now));
        assert!(!assignment.is_active_at(now + Duration::hours(2)));
    }

    #[test]
    fn test_promoted_soft_permit() {
        assert!(RoleAssignment::new("vpn", "VPN").is_promoted_soft_permit());
        assert!(RoleAssignment::new("vpn", "VPN")
            .with_assigner(SYSTEM_ASSIGNER)
            .is_promoted_soft_permit());
        assert!(!RoleAssignment::new("vpn", "VPN")
            .with_assigner("alice")
            .is_promoted_soft_permit());
        assert!(RoleAssignment::new("vpn", "VPN")
            .with_assigner("RoleBot")
            .is_promoted_by("RoleBot"));
    }

    #[test]
    fn test_role_targets_deduplicated() {
        let mut assignment = RoleAssignment::new("manager", "Manager");

        assert!(assignment.add_role_target(RoleTarget::new("LDAP", "cn=alice")));
        assert!(!assignment.add_role_target(RoleTarget::new("LDAP", "cn=alice").with_display_name("Alice")));
        assert!(assignment.add_role_target(RoleTarget::new("LDAP", "cn=alice").with_instance("eu")));

        assert_eq!(assignment.targets.len(), 2);
        assert!(assignment.has_matching_role_target(&RoleTarget::new("LDAP", "cn=alice")));
        assert!(!assignment.has_matching_role_target(&RoleTarget::new("AD", "alice")));
    }

    #[test]
    fn test_permits_deduplicated_by_id() {
        let mut assignment = RoleAssignment::new("manager", "Manager");

        assert!(assignment.add_permitted_role(RoleAssignment::new("vpn", "VPN")));
        assert!(!assignment.add_permitted_role(RoleAssignment::new("vpn", "VPN Access")));
        // same name, different id
        assert!(assignment.add_permitted_role(RoleAssignment::new("vpn-eu", "VPN")));

        assert_eq!(assignment.permits.len(), 2);
    }

    #[test]
    fn test_permits_deduplicated_by_name_without_ids() {
        let mut assignment = RoleAssignment::new("manager", "Manager");

        assert!(assignment.add_permitted_role(RoleAssignment::unpersisted("VPN")));
        assert!(!assignment.add_permitted_role(RoleAssignment::unpersisted("VPN")));
        // an identified permit still matches an unidentified entry by name
        assert!(!assignment.add_permitted_role(RoleAssignment::new("vpn", "VPN")));

        assert_eq!(assignment.permits.len(), 1);
    }

    #[test]
    fn test_permitted_role_prefers_id() {
        let mut assignment = RoleAssignment::new("manager", "Manager");
        assignment.add_permitted_role(RoleAssignment::new("r1", "Reports"));
        assignment.add_permitted_role(RoleAssignment::new("r2", "Reports"));

        let found = assignment
            .permitted_role(Some(&RoleId::from("r2")), Some("Reports"))
            .unwrap();
        assert_eq!(found.role_id, Some(RoleId::from("r2")));

        let found = assignment.permitted_role(None, Some("Reports")).unwrap();
        assert_eq!(found.role_id, Some(RoleId::from("r1")));

        // an unknown id does not fall back to a name match on identified entries
        assert!(assignment
            .permitted_role(Some(&RoleId::from("r9")), Some("Reports"))
            .is_none());
    }

    #[test]
    fn test_permitted_role_is_pure() {
        let mut assignment = RoleAssignment::new("manager", "Manager");
        assignment.add_permitted_role(RoleAssignment::new("r1", "Reports"));

        let found = assignment
            .permitted_role(Some(&RoleId::from("r1")), Some("Reporting"))
            .unwrap();
        assert_eq!(found.role_name, "Reports");
    }

    #[test]
    fn test_resolve_permitted_role_refreshes_name() {
        let mut assignment = RoleAssignment::new("manager", "Manager");
        assignment.add_permitted_role(RoleAssignment::new("r1", "Reports"));
        assignment.add_permitted_role(RoleAssignment::unpersisted("Dashboards"));

        let found = assignment
            .resolve_permitted_role(Some(&RoleId::from("r1")), Some("Reporting"))
            .unwrap();
        assert_eq!(found.role_name, "Reporting");
        assert_eq!(assignment.permits[0].role_name, "Reporting");

        // name matches never rename
        let found = assignment.resolve_permitted_role(None, Some("Dashboards")).unwrap();
        assert_eq!(found.role_name, "Dashboards");
    }

    #[test]
    fn test_remove_permitted_role() {
        let mut assignment = RoleAssignment::new("manager", "Manager");
        assignment.add_permitted_role(RoleAssignment::new("r1", "Reports"));
        assignment.add_permitted_role(RoleAssignment::new("r2", "Dashboards"));

        let removed = assignment
            .remove_permitted_role(Some(&RoleId::from("r1")), None)
            .unwrap();
        assert_eq!(removed.role_name, "Reports");
        assert_eq!(assignment.permits.len(), 1);
        assert!(assignment.remove_permitted_role(Some(&RoleId::from("r1")), None).is_none());
    }

    #[test]
    fn test_serde_read_model() {
        let json = r#"{
            "roleId": "manager",
            "roleName": "Manager",
            "assigner": "alice",
            "source": "request",
            "startDate": "2030-01-01T00:00:00Z",
            "targets": [{"application": "LDAP", "nativeIdentity": "cn=bob"}],
            "permits": [{"roleId": "vpn", "roleName": "VPN"}]
        }"#;

        let assignment: RoleAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(assignment.state, AssignmentState::Assigned);
        assert_eq!(assignment.source, AssignmentSource::Request);
        assert_eq!(assignment.assignment_id.len(), 32);
        assert_eq!(assignment.targets[0].native_identity, "cn=bob");
        assert!(assignment.permits[0].is_promoted_soft_permit());
        assert!(assignment.is_future_assignment());

        let value = serde_json::to_value(&assignment).unwrap();
        assert_eq!(value["roleName"], "Manager");
        assert_eq!(value["state"], "assigned");
        assert!(value.get("comments").is_none());
    }
}
