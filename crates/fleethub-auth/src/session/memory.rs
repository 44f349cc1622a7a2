//! In-memory session store using a Tokio mutex for single-node deployments.
//!
//! Both representations live behind one lock, so every mutation updates the
//! canonical record and its projection together.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use fleethub_core::error::AppError;
use fleethub_core::result::AppResult;
use fleethub_core::types::SessionLimit;
use fleethub_entity::session::{Admission, NewSession, Session, SessionProjection};

use super::store::SessionStore;
use crate::limiter::select_evictions;

#[derive(Debug, Default)]
struct InnerState {
    sessions: HashMap<Uuid, Session>,
    projections: HashMap<Uuid, SessionProjection>,
    /// Last creation timestamp handed out; keeps `created_at` strictly increasing.
    last_created_at: Option<DateTime<Utc>>,
}

impl InnerState {
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(at);
        at
    }

    fn insert(&mut self, data: NewSession) -> AppResult<Session> {
        if self.sessions.contains_key(&data.id) {
            return Err(AppError::conflict(format!(
                "Session {} already exists",
                data.id
            )));
        }
        let duplicate = self.sessions.values().any(|s| {
            s.access_digest == data.access_digest || s.refresh_digest == data.refresh_digest
        });
        if duplicate {
            return Err(AppError::conflict("Credential digest already in use"));
        }

        let now = self.next_created_at();
        let session = data.into_session(now);
        self.projections
            .insert(session.id, SessionProjection::from_session(&session));
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    fn revoke(&mut self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let Some(session) = self.sessions.get_mut(&id) else {
            return Ok(false);
        };
        if session.revoked {
            return Ok(false);
        }
        let projection = self.projections.get_mut(&id).ok_or_else(|| {
            AppError::persistence(format!("Projection row missing for session {id}"))
        })?;

        session.revoked = true;
        session.revoked_at = Some(now);
        session.updated_at = now;
        projection.active = false;
        projection.updated_at = now;
        Ok(true)
    }

    fn by_user_newest_first(&self, user_id: Uuid) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        sessions
    }
}

/// In-memory session store.
///
/// Suitable for single-node deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemorySessionStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of canonical session records held.
    pub async fn len(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: NewSession) -> AppResult<Session> {
        self.state.lock().await.insert(session)
    }

    async fn admit(&self, session: NewSession, limit: SessionLimit) -> AppResult<Admission> {
        let mut state = self.state.lock().await;

        // Validate the insert and every eviction before touching anything so
        // a failure leaves the user's sessions untouched.
        let duplicate = state.sessions.values().any(|s| {
            s.id == session.id
                || s.access_digest == session.access_digest
                || s.refresh_digest == session.refresh_digest
        });
        if duplicate {
            return Err(AppError::conflict("Credential digest already in use"));
        }

        let now = Utc::now();
        let active: Vec<Session> = state
            .by_user_newest_first(session.user_id)
            .into_iter()
            .filter(|s| s.is_active_at(now))
            .collect();
        let evicted = select_evictions(&active, limit);
        if let Some(id) = evicted
            .iter()
            .find(|id| !state.projections.contains_key(*id))
        {
            return Err(AppError::persistence(format!(
                "Projection row missing for session {id}"
            )));
        }

        for id in &evicted {
            state.revoke(*id, now)?;
        }
        let session = state.insert(session)?;
        Ok(Admission { session, evicted })
    }

    async fn find_by_access_digest(&self, digest: &str) -> AppResult<Option<Session>> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .values()
            .find(|s| s.access_digest == digest)
            .cloned())
    }

    async fn find_by_refresh_digest(
        &self,
        digest: &str,
        user_id: Uuid,
    ) -> AppResult<Option<Session>> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .values()
            .find(|s| s.user_id == user_id && s.refresh_digest == digest)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.state.lock().await.sessions.get(&id).cloned())
    }

    async fn find_projection(&self, id: Uuid) -> AppResult<Option<SessionProjection>> {
        Ok(self.state.lock().await.projections.get(&id).cloned())
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        self.state.lock().await.revoke(id, Utc::now())
    }

    async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let ids: Vec<Uuid> = state
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && !s.revoked)
            .map(|s| s.id)
            .collect();

        let mut revoked = 0;
        for id in ids {
            if state.revoke(id, now)? {
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let state = self.state.lock().await;
        let now = Utc::now();
        Ok(state
            .by_user_newest_first(user_id)
            .into_iter()
            .filter(|s| s.is_active_at(now))
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid, limit: Option<u32>) -> AppResult<Vec<Session>> {
        let state = self.state.lock().await;
        let mut sessions = state.by_user_newest_first(user_id);
        if let Some(limit) = limit {
            sessions.truncate(limit as usize);
        }
        Ok(sessions)
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>, limit: u32) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut expired: Vec<(DateTime<Utc>, Uuid)> = state
            .sessions
            .values()
            .filter(|s| s.refresh_expires_at < cutoff)
            .map(|s| (s.refresh_expires_at, s.id))
            .collect();
        expired.sort();
        expired.truncate(limit as usize);

        for (_, id) in &expired {
            state.sessions.remove(id);
            state.projections.remove(id);
        }
        Ok(expired.len() as u64)
    }
}
