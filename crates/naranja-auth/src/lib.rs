//! # naranja-auth
//!
//! Authorization and caller identity for Naranja.
//!
//! ## Modules
//!
//! - `policy`: access-level permission table, route guards, and the
//!   [`AccessPolicy`] facade
//! - `jwt`: validation of the identity provider's HS256 access tokens

pub mod jwt;
pub mod policy;

pub use jwt::{Claims, JwtDecoder};
pub use policy::{AccessPolicy, Permission, PermissionTable, RouteGuard};
