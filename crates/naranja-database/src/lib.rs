//! # naranja-database
//!
//! PostgreSQL connection management, the store traits the services depend
//! on, their Postgres repositories, and an in-memory store used for
//! development and tests.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    AssignmentStore, DepartmentStore, RequirementStore, RoleHistoryStore, RoleStore, Stores,
    SyncView, UserStore,
};
