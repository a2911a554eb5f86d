//! Department entities and hierarchy helpers.

pub mod model;
pub mod tree;

pub use model::{Department, NewDepartment};
pub use tree::{ancestors_of, would_create_cycle};
