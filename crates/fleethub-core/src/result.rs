//! Convenience result type alias for FleetHub.

use crate::error::AppError;

/// A specialized `Result` type for FleetHub operations.
pub type AppResult<T> = Result<T, AppError>;
