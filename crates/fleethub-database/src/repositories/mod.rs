//! Concrete repository implementations.

pub mod session;
pub mod user;

use fleethub_core::error::{AppError, ErrorKind};

pub use session::SessionRepository;
pub use user::UserRepository;

/// Map a sqlx error from a write path into an [`AppError`].
///
/// Unique-constraint violations become `Conflict`; everything else is a
/// `Persistence` failure.
pub(crate) fn map_write_error(context: &str, err: sqlx::Error) -> AppError {
    let is_unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());

    if is_unique {
        AppError::with_source(ErrorKind::Conflict, format!("{context}: duplicate key"), err)
    } else {
        AppError::with_source(ErrorKind::Persistence, context.to_string(), err)
    }
}

/// Map a sqlx error from a read path into an [`AppError`].
pub(crate) fn map_read_error(context: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Persistence, context.to_string(), err)
}
