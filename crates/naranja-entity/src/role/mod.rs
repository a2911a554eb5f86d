//! Role (job profile) entities.

pub mod model;

pub use model::{NewRole, Role};
