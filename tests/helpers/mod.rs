//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use fleethub_auth::{
    EvictionNotice, EvictionNotifier, IssuedSession, JwtDecoder, JwtEncoder, MemorySessionStore,
    MemoryUserDirectory, SessionManager, SessionStore, TracingAuditSink,
};
use fleethub_core::config::AppConfig;
use fleethub_core::result::AppResult;
use fleethub_entity::user::{AuthUser, UserRole};

/// Notifier that keeps every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<EvictionNotice>>,
}

impl RecordingNotifier {
    /// Notices received so far.
    pub async fn notices(&self) -> Vec<EvictionNotice> {
        self.notices.lock().await.clone()
    }

    /// Wait until at least `count` notices arrived; delivery runs on a spawned task.
    pub async fn wait_for(&self, count: usize) -> Vec<EvictionNotice> {
        for _ in 0..100 {
            let notices = self.notices().await;
            if notices.len() >= count {
                return notices;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.notices().await
    }
}

#[async_trait]
impl EvictionNotifier for RecordingNotifier {
    async fn notify_eviction(&self, notice: &EvictionNotice) -> AppResult<()> {
        self.notices.lock().await.push(notice.clone());
        Ok(())
    }
}

/// Test configuration with a fixed signing key.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

/// Test application context backed by in-memory collaborators.
pub struct TestApp {
    /// The manager under test.
    pub manager: SessionManager,
    /// The store behind the manager.
    pub store: Arc<MemorySessionStore>,
    /// Users known to the manager.
    pub users: Arc<MemoryUserDirectory>,
    /// Captured eviction notices.
    pub notifier: Arc<RecordingNotifier>,
    /// Application config.
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application with default settings.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with the given settings.
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemorySessionStore::new());
        Self::with_store(config, store.clone(), store)
    }

    /// Create a test application whose manager talks to `backend`.
    ///
    /// `store` is the underlying memory store used for assertions.
    pub fn with_store(
        config: AppConfig,
        store: Arc<MemorySessionStore>,
        backend: Arc<dyn SessionStore>,
    ) -> Self {
        let users = Arc::new(MemoryUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::default());

        let manager = SessionManager::new(
            Arc::new(JwtEncoder::new(&config.auth)),
            Arc::new(JwtDecoder::new(&config.auth)),
            backend,
            users.clone(),
            notifier.clone(),
            Arc::new(TracingAuditSink),
            config.session.clone(),
            config.security.clone(),
        );

        Self {
            manager,
            store,
            users,
            notifier,
            config,
        }
    }

    /// Register a user in the directory.
    pub async fn create_user(&self, email: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role: UserRole::Driver,
            company_id: Some(Uuid::new_v4()),
        };
        self.users.insert(user.clone()).await;
        user
    }

    /// Log `user` in from `address`.
    pub async fn login(&self, user: &AuthUser, address: &str) -> IssuedSession {
        self.manager
            .issue_session(user, address, "FleetHub-Android/4.2")
            .await
            .expect("login should succeed")
    }

    /// Assert that every stored session agrees with its projection.
    pub async fn assert_projections_agree(&self, user_id: Uuid) {
        for session in self.store.list_by_user(user_id, None).await.unwrap() {
            let projection = self
                .store
                .find_projection(session.id)
                .await
                .unwrap()
                .expect("projection row missing");
            assert_eq!(
                session.revoked, !projection.active,
                "projection diverged for session {}",
                session.id
            );
        }
    }
}
