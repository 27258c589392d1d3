//! Segregation of duty evaluation
//!
//! Role identity is the stable [`RoleId`](rolegraph_core::RoleId); role
//! names only feed diagnostics.

mod constraint;
mod policy;
mod violation;

pub use constraint::SodConstraint;
pub use policy::SodPolicy;
pub use violation::SodViolation;

/// Sum of the weights of the given violations
pub fn sod_score(violations: &[SodViolation]) -> i64 {
    violations.iter().map(|v| i64::from(v.weight)).sum()
}
