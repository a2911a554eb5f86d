//! # naranja-core
//!
//! Core crate for the Naranja role and assignment service. Contains
//! configuration schemas, typed identifiers, pagination types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Naranja crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
