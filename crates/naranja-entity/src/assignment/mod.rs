//! User assignment entities.

pub mod model;
pub mod source;

pub use model::{NewAssignment, UserAssignment};
pub use source::AssignmentSource;
