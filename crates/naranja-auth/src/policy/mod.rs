//! Access-level based authorization.

pub mod access;
pub mod permission;
pub mod routes;
pub mod table;

pub use access::AccessPolicy;
pub use permission::Permission;
pub use routes::{ROUTE_GUARDS, RouteGuard};
pub use table::PermissionTable;
