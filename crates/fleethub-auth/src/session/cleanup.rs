//! Maintenance sweep for long-expired sessions.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use fleethub_core::config::SessionConfig;
use fleethub_core::events::SessionEvent;
use fleethub_core::result::AppResult;

use crate::notify::{AuditSink, emit};

use super::store::SessionStore;

/// Hard-deletes sessions whose refresh horizon passed more than the
/// retention window ago. Projection rows go with them.
#[derive(Clone)]
pub struct SessionCleanup {
    /// Session persistence.
    session_store: Arc<dyn SessionStore>,
    /// Audit trail.
    audit: Arc<dyn AuditSink>,
    /// How long ended sessions are kept.
    retention: Duration,
    /// Maximum rows deleted per run.
    batch_size: u32,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup")
            .field("retention", &self.retention)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl SessionCleanup {
    /// Creates a new session cleanup handler.
    pub fn new(
        session_store: Arc<dyn SessionStore>,
        audit: Arc<dyn AuditSink>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            session_store,
            audit,
            retention: config.retention(),
            batch_size: config.sweep_batch_size,
        }
    }

    /// Runs one bounded sweep.
    ///
    /// Returns the number of sessions deleted.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - self.retention;
        let deleted = self
            .session_store
            .delete_expired(cutoff, self.batch_size)
            .await?;

        if deleted == 0 {
            debug!(cutoff = %cutoff, "No expired sessions to purge");
            return Ok(0);
        }

        info!(
            deleted = deleted,
            cutoff = %cutoff,
            batch_size = self.batch_size,
            "Purged expired sessions"
        );
        emit(
            Arc::clone(&self.audit),
            None,
            SessionEvent::Purged { count: deleted },
        );

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use fleethub_entity::session::NewSession;

    use super::*;
    use crate::notify::TracingAuditSink;
    use crate::session::memory::MemorySessionStore;

    fn ended(days_ago: i64, tag: &str) -> NewSession {
        let horizon = Utc::now() - Duration::days(days_ago);
        NewSession {
            id: Uuid::now_v7(),
            user_id: Uuid::new_v4(),
            access_digest: format!("access-{tag}"),
            refresh_digest: format!("refresh-{tag}"),
            source_address: "203.0.113.4".to_string(),
            client_descriptor: "FleetHub-Web".to_string(),
            access_expires_at: horizon - Duration::hours(1),
            refresh_expires_at: horizon,
        }
    }

    #[tokio::test]
    async fn test_sweep_honours_retention_and_batch() {
        let store = Arc::new(MemorySessionStore::new());
        store.create(ended(30, "a")).await.unwrap();
        store.create(ended(20, "b")).await.unwrap();
        store.create(ended(10, "c")).await.unwrap();
        let kept = store.create(ended(2, "d")).await.unwrap();

        let config = SessionConfig {
            retention_days: 7,
            sweep_batch_size: 2,
            ..SessionConfig::default()
        };
        let cleanup = SessionCleanup::new(store.clone(), Arc::new(TracingAuditSink), &config);

        assert_eq!(cleanup.run_cleanup().await.unwrap(), 2);
        assert_eq!(cleanup.run_cleanup().await.unwrap(), 1);
        assert_eq!(cleanup.run_cleanup().await.unwrap(), 0);
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_id(kept.id).await.unwrap().is_some());
    }
}
