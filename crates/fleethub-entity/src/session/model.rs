//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One authenticated device/client of a user.
///
/// A session is active while it is not revoked and its refresh horizon lies
/// in the future. Revocation and expiry are both terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 digest of the access credential.
    #[serde(skip_serializing, default)]
    pub access_digest: String,
    /// SHA-256 digest of the refresh credential.
    #[serde(skip_serializing, default)]
    pub refresh_digest: String,
    /// Client address captured at issuance.
    pub source_address: String,
    /// Client descriptor (typically the User-Agent) captured at issuance.
    pub client_descriptor: String,
    /// End of the access horizon.
    pub access_expires_at: DateTime<Utc>,
    /// End of the refresh horizon; always after `access_expires_at`.
    pub refresh_expires_at: DateTime<Utc>,
    /// Whether the session was revoked. Never flips back.
    pub revoked: bool,
    /// When the session was revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is active at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.refresh_expires_at > now
    }

    /// Check whether the session is active right now.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Check whether access credentials of this session are still honoured at `now`.
    pub fn accepts_access_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.access_expires_at > now
    }

    /// Wall-clock lifetime in minutes.
    ///
    /// Runs until `revoked_at`; unrevoked sessions run until `now`, capped at
    /// their refresh horizon.
    pub fn duration_minutes(&self, now: DateTime<Utc>) -> i64 {
        let end = match self.revoked_at {
            Some(revoked_at) => revoked_at,
            None => now.min(self.refresh_expires_at),
        };
        (end - self.created_at).num_minutes().max(0)
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// Pre-generated session ID.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 digest of the access credential.
    pub access_digest: String,
    /// SHA-256 digest of the refresh credential.
    pub refresh_digest: String,
    /// Client address.
    pub source_address: String,
    /// Client descriptor.
    pub client_descriptor: String,
    /// End of the access horizon.
    pub access_expires_at: DateTime<Utc>,
    /// End of the refresh horizon.
    pub refresh_expires_at: DateTime<Utc>,
}

impl NewSession {
    /// Materialize the canonical row as written at `now`.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            id: self.id,
            user_id: self.user_id,
            access_digest: self.access_digest,
            refresh_digest: self.refresh_digest,
            source_address: self.source_address,
            client_descriptor: self.client_descriptor,
            access_expires_at: self.access_expires_at,
            refresh_expires_at: self.refresh_expires_at,
            revoked: false,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome of admitting a session under a per-user cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// The session as written.
    pub session: Session,
    /// Sessions revoked in the same unit of work, oldest first.
    pub evicted: Vec<Uuid>,
}
