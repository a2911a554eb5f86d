//! Mapping of sqlx failures onto [`AppError`] kinds.
//!
//! Every repository funnels its errors through [`classify`] so retry
//! decisions upstream depend only on `ErrorKind`.

use naranja_core::error::{AppError, ErrorKind};

/// SQLSTATE codes worth retrying: serialization failure and deadlock.
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

/// Classify a sqlx error and wrap it with a message.
pub fn classify(message: impl Into<String>, err: sqlx::Error) -> AppError {
    AppError::with_source(kind_of(&err), message, err)
}

/// The error kind a sqlx error maps to.
pub fn kind_of(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => ErrorKind::TransientStore,
        sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::Conflict,
        sqlx::Error::Database(db)
            if db
                .code()
                .is_some_and(|code| RETRYABLE_SQLSTATES.iter().any(|s| code == *s)) =>
        {
            ErrorKind::TransientStore
        }
        _ => ErrorKind::Database,
    }
}
