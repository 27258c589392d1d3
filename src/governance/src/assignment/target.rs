//! Account-level binding of a role assignment

use serde::{Deserialize, Serialize};

/// Application account a role assignment was provisioned against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTarget {
    /// Application name
    pub application: String,

    /// Account identifier on the application
    pub native_identity: String,

    /// Application instance, for multi-instance applications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Role the account was provisioned for, when it differs from the assignment's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

impl RoleTarget {
    pub fn new(application: impl Into<String>, native_identity: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            native_identity: native_identity.into(),
            instance: None,
            display_name: None,
            role_name: None,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Whether both targets bind the same account
    ///
    /// Compares application, native identity and instance only.
    pub fn matches(&self, other: &RoleTarget) -> bool {
        self.application == other.application
            && self.native_identity == other.native_identity
            && self.instance == other.instance
    }
}
