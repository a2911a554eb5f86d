//! # naranja-entity
//!
//! Domain entity models for Naranja. Every struct in this crate represents
//! a database table row or a domain value object. Row types additionally
//! derive `sqlx::FromRow`.

pub mod assignment;
pub mod department;
pub mod history;
pub mod requirement;
pub mod role;
pub mod user;
