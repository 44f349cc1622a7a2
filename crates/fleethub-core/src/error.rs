//! Unified application error types for FleetHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Message returned to external callers for every credential or session-state
/// rejection. The specific kind is only logged.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Authentication failed for a reason not covered by a narrower kind.
    Authentication,
    /// A credential's signature did not verify.
    InvalidSignature,
    /// A credential could not be parsed or had the wrong shape.
    Malformed,
    /// A credential's embedded expiry has passed.
    Expired,
    /// Storage says the session behind an access credential is revoked,
    /// missing, or past its stored expiry.
    SessionInvalid,
    /// Storage has no live session for the presented refresh credential.
    InvalidRefreshToken,
    /// A conflict occurred (duplicate digest, concurrent modification, etc.).
    Conflict,
    /// Storage is unavailable or a dual-table write could not complete.
    Persistence,
    /// A caller-supplied deadline elapsed.
    Timeout,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind is a credential or session-state rejection.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication
                | Self::InvalidSignature
                | Self::Malformed
                | Self::Expired
                | Self::SessionInvalid
                | Self::InvalidRefreshToken
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            Self::Malformed => write!(f, "MALFORMED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::SessionInvalid => write!(f, "SESSION_INVALID"),
            Self::InvalidRefreshToken => write!(f, "INVALID_REFRESH_TOKEN"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Persistence => write!(f, "PERSISTENCE"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout FleetHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a generic authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a session-invalid error.
    pub fn session_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionInvalid, message)
    }

    /// Create an invalid-refresh-token error.
    pub fn invalid_refresh_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRefreshToken, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Persistence, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is a credential or session-state rejection.
    pub fn is_auth_failure(&self) -> bool {
        self.kind.is_auth_failure()
    }

    /// The message safe to show an external client.
    ///
    /// Every authentication failure collapses to [`AUTH_FAILED_MESSAGE`] so
    /// clients cannot tell a bad signature from a revoked session.
    pub fn public_message(&self) -> &str {
        if self.is_auth_failure() {
            AUTH_FAILED_MESSAGE
        } else {
            &self.message
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
