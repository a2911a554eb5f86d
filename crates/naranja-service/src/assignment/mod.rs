//! Required-item resolution and assignment synchronization.

pub mod resolver;
pub mod synchronizer;

pub use resolver::{AssignmentResolver, RoleSnapshot};
pub use synchronizer::{AssignmentSynchronizer, BatchError, BatchReport, SyncOptions, SyncOutcome};
