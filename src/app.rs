//! Wires the crates together into a running service.

use std::sync::Arc;

use fleethub_auth::{
    DbUserDirectory, JwtDecoder, JwtEncoder, LogEvictionNotifier, PgSessionStore, SessionCleanup,
    SessionManager, SessionStore, TracingAuditSink,
};
use fleethub_core::config::AppConfig;
use fleethub_core::error::AppError;
use fleethub_database::DatabasePool;
use fleethub_worker::SessionSweepJob;

/// Shared service components.
#[derive(Debug)]
pub struct AppContext {
    /// Database pool.
    pub db: DatabasePool,
    /// Session lifecycle manager.
    pub manager: Arc<SessionManager>,
    /// Maintenance sweep.
    pub cleanup: Arc<SessionCleanup>,
}

impl AppContext {
    /// Connect to the database and build the session components.
    pub async fn build(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;

        let store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(Arc::new(db.sessions())));
        let audit = Arc::new(TracingAuditSink);

        let manager = SessionManager::new(
            Arc::new(JwtEncoder::new(&config.auth)),
            Arc::new(JwtDecoder::new(&config.auth)),
            Arc::clone(&store),
            Arc::new(DbUserDirectory::new(Arc::new(db.users()))),
            Arc::new(LogEvictionNotifier),
            audit.clone(),
            config.session.clone(),
            config.security.clone(),
        );
        let cleanup = SessionCleanup::new(store, audit, &config.session);

        tracing::info!(
            max_sessions_per_user = config.session.max_sessions_per_user,
            "Session components initialized"
        );

        Ok(Self {
            db,
            manager: Arc::new(manager),
            cleanup: Arc::new(cleanup),
        })
    }

    /// Sweep job for the scheduler.
    pub fn sweep_job(&self) -> SessionSweepJob {
        SessionSweepJob::new(Arc::clone(&self.cleanup))
    }
}
