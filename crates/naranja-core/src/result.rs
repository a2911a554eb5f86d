//! Convenience result type alias for Naranja.

use crate::error::AppError;

/// A specialized `Result` type for Naranja operations.
pub type AppResult<T> = Result<T, AppError>;
