//! Role requirements: the modules, documents, and behaviours a role mandates.

pub mod item;
pub mod model;

pub use item::{ItemKey, ItemType};
pub use model::RequiredItem;
