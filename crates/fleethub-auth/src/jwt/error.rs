//! Credential decode failures.

use fleethub_core::error::{AppError, ErrorKind};
use thiserror::Error;

use super::claims::TokenType;

/// Why a credential was rejected without consulting storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The signature did not verify against the signing key.
    #[error("invalid token signature")]
    InvalidSignature,
    /// The embedded `exp` has passed.
    #[error("token has expired")]
    Expired,
    /// The token could not be parsed or lacks required claims.
    #[error("malformed token: {0}")]
    Malformed(String),
    /// A refresh token was presented where an access token was expected, or vice versa.
    #[error("wrong token type: expected {expected}")]
    WrongType {
        /// The type the caller required.
        expected: TokenType,
    },
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl TokenError {
    /// The matching application error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSignature => ErrorKind::InvalidSignature,
            Self::Expired => ErrorKind::Expired,
            Self::Malformed(_) | Self::WrongType { .. } => ErrorKind::Malformed,
            Self::Encoding(_) => ErrorKind::Internal,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtKind;

        match err.kind() {
            JwtKind::ExpiredSignature => Self::Expired,
            JwtKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}
