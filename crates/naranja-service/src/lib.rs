//! # naranja-service
//!
//! Business logic for keeping users' assignments consistent with their
//! role. Each service receives its stores and the access policy at
//! construction time via `Arc` references.

pub mod assignment;
pub mod context;
pub mod department;
pub mod history;
pub mod retry;

#[cfg(test)]
mod testing;

pub use assignment::{
    AssignmentResolver, AssignmentSynchronizer, BatchError, BatchReport, RoleSnapshot,
    SyncOptions, SyncOutcome,
};
pub use context::RequestContext;
pub use department::DepartmentService;
pub use history::{DuplicateTransition, RoleChangeAuditor, RoleChangeOutcome};
