//! Session-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to user sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A user logged in and a session was created.
    Created {
        /// The session ID.
        session_id: Uuid,
        /// The user ID.
        user_id: Uuid,
        /// The source address of the login.
        source_address: String,
    },
    /// A session was revoked explicitly (logout or admin action).
    Revoked {
        /// The session ID.
        session_id: Uuid,
        /// Why the session ended.
        reason: String,
    },
    /// Every session of a user was revoked.
    RevokedAll {
        /// The user ID.
        user_id: Uuid,
        /// How many sessions were newly revoked.
        count: u64,
    },
    /// A session was evicted to stay under the concurrent-session cap.
    Evicted {
        /// The evicted session ID.
        session_id: Uuid,
        /// The user ID.
        user_id: Uuid,
        /// The session admitted in its place.
        replaced_by: Uuid,
    },
    /// A refresh credential was exchanged for a new session.
    Refreshed {
        /// The session consumed by the refresh.
        previous_session_id: Uuid,
        /// The session created by the refresh.
        session_id: Uuid,
        /// The user ID.
        user_id: Uuid,
    },
    /// The maintenance sweep removed expired rows.
    Purged {
        /// Rows deleted in this run.
        count: u64,
    },
}

impl SessionEvent {
    /// Stable event name used in structured logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "session.created",
            Self::Revoked { .. } => "session.revoked",
            Self::RevokedAll { .. } => "session.revoked_all",
            Self::Evicted { .. } => "session.evicted",
            Self::Refreshed { .. } => "session.refreshed",
            Self::Purged { .. } => "session.purged",
        }
    }
}
