//! Role assignment ledger
//!
//! Records who assigned which role, when, against which accounts, and which
//! detected roles each assignment permits.

mod ledger;
mod record;
mod target;

pub use ledger::RoleAssignmentLedger;
pub use record::{AssignmentSource, AssignmentState, RoleAssignment};
pub use target::RoleTarget;
