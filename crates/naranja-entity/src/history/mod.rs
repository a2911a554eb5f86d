//! Role change history entities.

pub mod model;

pub use model::{Placement, RoleChange, RoleChangeHistoryEntry};
