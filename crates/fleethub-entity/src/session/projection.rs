//! Denormalized session view used for dashboards and reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use uuid::Uuid;

use super::model::Session;

/// Reporting row kept in lockstep with the canonical [`Session`].
///
/// `active` is the negation of the canonical `revoked` flag; both are
/// written in the same unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SessionProjection {
    /// Same ID as the canonical session.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// JSON snapshot of session metadata.
    pub snapshot: serde_json::Value,
    /// Whether the canonical session is still unrevoked.
    pub active: bool,
    /// When the projection row was created.
    pub created_at: DateTime<Utc>,
    /// When the projection row was last written.
    pub updated_at: DateTime<Utc>,
}

impl SessionProjection {
    /// Build the projection row for a freshly created session.
    pub fn from_session(session: &Session) -> Self {
        let snapshot = json!({
            "source_address": session.source_address,
            "client_descriptor": session.client_descriptor,
            "access_expires_at": session.access_expires_at,
            "refresh_expires_at": session.refresh_expires_at,
            "created_at": session.created_at,
        });

        Self {
            id: session.id,
            user_id: session.user_id,
            snapshot,
            active: !session.revoked,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }

    /// Check whether this row agrees with the canonical session.
    pub fn agrees_with(&self, session: &Session) -> bool {
        self.id == session.id && self.active == !session.revoked
    }
}
