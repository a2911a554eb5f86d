//! # naranja-api
//!
//! HTTP API layer for Naranja built on Axum.
//!
//! Exposes role synchronization, role changes, curriculum edits, and the
//! department tree over JSON, together with middleware (CORS, request
//! logging), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
