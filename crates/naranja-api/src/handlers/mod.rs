//! Route handlers organized by domain.

pub mod access;
pub mod department;
pub mod health;
pub mod role;
pub mod sync;
pub mod user;
