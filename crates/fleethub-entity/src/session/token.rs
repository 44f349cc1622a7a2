//! Credential pair handed back to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of [`IssuedTokens::token_type`].
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// The credential pair returned once, in full, on login or refresh.
///
/// Raw credentials are never persisted; only their digests are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedTokens {
    /// Short-lived access credential.
    pub access_token: String,
    /// Long-lived, single-use refresh credential.
    pub refresh_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Seconds until the access credential expires.
    pub expires_in: i64,
    /// When the access credential expires.
    pub expires_at: DateTime<Utc>,
}
