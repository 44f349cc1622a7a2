//! Session storage abstraction and its PostgreSQL implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use fleethub_core::result::AppResult;
use fleethub_core::types::SessionLimit;
use fleethub_database::repositories::session::SessionRepository;
use fleethub_entity::session::{Admission, NewSession, Session, SessionProjection};

/// Durable session records with a canonical row and a reporting projection.
///
/// Every mutation updates both representations as one unit: either both
/// change or neither does, and a failure surfaces as a persistence error.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Insert a session and its projection.
    ///
    /// Fails with a conflict when either digest already exists.
    async fn create(&self, session: NewSession) -> AppResult<Session>;

    /// Insert `session` under `limit` as one unit of work.
    ///
    /// The user's active set is read, the oldest sessions that would push
    /// the user over `limit` are revoked, and the new session is written
    /// while no other admit for the same user can interleave. Nothing
    /// changes when any step fails.
    async fn admit(&self, session: NewSession, limit: SessionLimit) -> AppResult<Admission>;

    /// Look up a session by access digest, regardless of its state.
    async fn find_by_access_digest(&self, digest: &str) -> AppResult<Option<Session>>;

    /// Look up a user's session by refresh digest, regardless of its state.
    async fn find_by_refresh_digest(
        &self,
        digest: &str,
        user_id: Uuid,
    ) -> AppResult<Option<Session>>;

    /// Look up a session by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Look up the projection row of a session.
    async fn find_projection(&self, id: Uuid) -> AppResult<Option<SessionProjection>>;

    /// Revoke a session. Returns `false` when it was already revoked or absent.
    async fn revoke(&self, id: Uuid) -> AppResult<bool>;

    /// Revoke every unrevoked session of a user, returning how many changed.
    async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64>;

    /// A user's active sessions, newest first.
    async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<Session>>;

    /// A user's sessions of any status, newest first.
    async fn list_by_user(&self, user_id: Uuid, limit: Option<u32>) -> AppResult<Vec<Session>>;

    /// Hard-delete up to `limit` sessions whose refresh horizon is before `cutoff`.
    async fn delete_expired(&self, cutoff: DateTime<Utc>, limit: u32) -> AppResult<u64>;
}

/// PostgreSQL-backed store wrapping the session repository.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    /// Session database repository.
    repo: Arc<SessionRepository>,
}

impl PgSessionStore {
    /// Creates a new PostgreSQL session store.
    pub fn new(repo: Arc<SessionRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: NewSession) -> AppResult<Session> {
        self.repo.create(&session).await
    }

    async fn admit(&self, session: NewSession, limit: SessionLimit) -> AppResult<Admission> {
        self.repo.admit(&session, limit).await
    }

    async fn find_by_access_digest(&self, digest: &str) -> AppResult<Option<Session>> {
        self.repo.find_by_access_digest(digest).await
    }

    async fn find_by_refresh_digest(
        &self,
        digest: &str,
        user_id: Uuid,
    ) -> AppResult<Option<Session>> {
        self.repo.find_by_refresh_digest(digest, user_id).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        self.repo.find_by_id(id).await
    }

    async fn find_projection(&self, id: Uuid) -> AppResult<Option<SessionProjection>> {
        self.repo.find_projection(id).await
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        self.repo.revoke(id).await
    }

    async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64> {
        self.repo.revoke_all(user_id).await
    }

    async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        self.repo.list_active(user_id).await
    }

    async fn list_by_user(&self, user_id: Uuid, limit: Option<u32>) -> AppResult<Vec<Session>> {
        self.repo.list_by_user(user_id, limit).await
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>, limit: u32) -> AppResult<u64> {
        self.repo.delete_expired(cutoff, limit).await
    }
}
