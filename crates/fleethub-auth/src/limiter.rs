//! Per-user concurrent session cap.
//!
//! When a new login would push a user over the cap, the oldest active
//! sessions are chosen for eviction. [`SessionLimiter::admit`] makes that
//! choice inside the store's unit of work, so concurrent logins of one user
//! cannot both see room under the cap, whichever node they land on.
//! [`SessionLimiter::lock_user`] additionally queues logins of one user
//! within this process so they do not contend on the store.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use fleethub_core::result::AppResult;
use fleethub_core::types::SessionLimit;
use fleethub_entity::session::{Admission, NewSession, Session};

use crate::session::store::SessionStore;

/// Outcome of a cap check ahead of a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitDecision {
    /// Whether the new session may be created.
    pub admitted: bool,
    /// Sessions to revoke before the new one is written, oldest first.
    pub evicted: Vec<Uuid>,
}

/// Holds a user's session-set lock until dropped.
#[derive(Debug)]
pub struct UserSessionGuard {
    user_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl UserSessionGuard {
    /// The user whose session set is locked.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl Drop for UserSessionGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map still references the mutex: nobody holds or awaits it.
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Enforces the per-user session cap.
#[derive(Debug, Clone)]
pub struct SessionLimiter {
    /// Session persistence.
    store: Arc<dyn SessionStore>,
    /// One mutex per user with an in-flight login.
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionLimiter {
    /// Creates a new session limiter.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Serializes cap decisions for one user within this process.
    pub async fn lock_user(&self, user_id: Uuid) -> UserSessionGuard {
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        UserSessionGuard {
            user_id,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Decides which sessions must go for one more session to fit under `max_sessions`.
    ///
    /// Read-only: the answer reflects the active set at the time of the call.
    /// A `max_sessions` of zero means unlimited.
    pub async fn enforce_limit(&self, user_id: Uuid, max_sessions: u32) -> AppResult<LimitDecision> {
        let limit = SessionLimit::from(max_sessions);
        let active = self.store.list_active(user_id).await?;
        let evicted = select_evictions(&active, limit);

        if evicted.is_empty() {
            debug!(
                user_id = %user_id,
                active = active.len(),
                "Session cap not reached"
            );
        } else {
            info!(
                user_id = %user_id,
                active = active.len(),
                max_sessions = max_sessions,
                evicting = evicted.len(),
                "Session cap reached, evicting oldest sessions"
            );
        }

        Ok(LimitDecision {
            admitted: true,
            evicted,
        })
    }
}

impl SessionLimiter {
    /// Writes `session` under `max_sessions`, evicting the oldest active
    /// sessions in the same unit of work.
    pub async fn admit(&self, session: NewSession, max_sessions: u32) -> AppResult<Admission> {
        let user_id = session.user_id;
        let admission = self
            .store
            .admit(session, SessionLimit::from(max_sessions))
            .await?;

        if !admission.evicted.is_empty() {
            info!(
                user_id = %user_id,
                max_sessions = max_sessions,
                evicted = admission.evicted.len(),
                "Session cap reached, evicted oldest sessions"
            );
        }
        Ok(admission)
    }
}

/// Picks the oldest sessions to revoke so that one more fits under `limit`.
pub fn select_evictions(active: &[Session], limit: SessionLimit) -> Vec<Uuid> {
    let needed = limit.evictions_needed(active.len());
    if needed == 0 {
        return Vec::new();
    }

    let mut oldest_first: Vec<&Session> = active.iter().collect();
    oldest_first.sort_by_key(|s| (s.created_at, s.id));
    oldest_first.into_iter().take(needed).map(|s| s.id).collect()
}
