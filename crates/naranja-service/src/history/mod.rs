//! Role change auditing.

pub mod auditor;

pub use auditor::{DuplicateTransition, RoleChangeAuditor, RoleChangeOutcome};
