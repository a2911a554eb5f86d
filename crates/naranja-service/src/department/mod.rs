//! Department tree management.

pub mod service;

pub use service::DepartmentService;
