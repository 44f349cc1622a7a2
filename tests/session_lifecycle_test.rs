//! Integration tests for issuing, validating, refreshing, and revoking sessions.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use fleethub_auth::{MemorySessionStore, SessionStore};
use fleethub_core::error::{AUTH_FAILED_MESSAGE, ErrorKind};
use fleethub_core::result::AppResult;
use fleethub_core::types::SessionLimit;
use fleethub_entity::session::{
    Admission, NewSession, Session, SessionProjection, TOKEN_TYPE_BEARER,
};

/// Store wrapper whose rows report an access horizon already in the past,
/// while the credentials handed out still carry a future `exp`.
#[derive(Debug)]
struct LapsedAccessStore {
    inner: Arc<MemorySessionStore>,
}

impl LapsedAccessStore {
    fn lapse(session: Option<Session>) -> Option<Session> {
        session.map(|mut s| {
            s.access_expires_at = Utc::now() - Duration::seconds(1);
            s
        })
    }
}

#[async_trait]
impl SessionStore for LapsedAccessStore {
    async fn create(&self, session: NewSession) -> AppResult<Session> {
        self.inner.create(session).await
    }

    async fn admit(&self, session: NewSession, limit: SessionLimit) -> AppResult<Admission> {
        self.inner.admit(session, limit).await
    }

    async fn find_by_access_digest(&self, digest: &str) -> AppResult<Option<Session>> {
        Ok(Self::lapse(self.inner.find_by_access_digest(digest).await?))
    }

    async fn find_by_refresh_digest(
        &self,
        digest: &str,
        user_id: Uuid,
    ) -> AppResult<Option<Session>> {
        Ok(Self::lapse(
            self.inner.find_by_refresh_digest(digest, user_id).await?,
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        self.inner.find_by_id(id).await
    }

    async fn find_projection(&self, id: Uuid) -> AppResult<Option<SessionProjection>> {
        self.inner.find_projection(id).await
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        self.inner.revoke(id).await
    }

    async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64> {
        self.inner.revoke_all(user_id).await
    }

    async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        self.inner.list_active(user_id).await
    }

    async fn list_by_user(&self, user_id: Uuid, limit: Option<u32>) -> AppResult<Vec<Session>> {
        self.inner.list_by_user(user_id, limit).await
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>, limit: u32) -> AppResult<u64> {
        self.inner.delete_expired(cutoff, limit).await
    }
}

#[tokio::test]
async fn test_issue_then_validate() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;

    let issued = app.login(&user, "10.1.0.1").await;
    assert_eq!(issued.tokens.token_type, TOKEN_TYPE_BEARER);
    assert!(issued.tokens.expires_in > 0);
    assert!(issued.tokens.expires_at > Utc::now());
    assert!(issued.evicted.is_empty());

    let identity = app
        .manager
        .validate_access(&issued.tokens.access_token)
        .await
        .unwrap();
    assert_eq!(identity.user_id, user.id);
    assert_eq!(identity.email, user.email);
    assert_eq!(identity.role, user.role);
    assert_eq!(identity.company_id, user.company_id);
    assert_eq!(identity.session_id, issued.session.id);
}

#[tokio::test]
async fn test_raw_credentials_are_not_stored() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;

    let stored = app.store.find_by_id(issued.session.id).await.unwrap().unwrap();
    assert_ne!(stored.access_digest, issued.tokens.access_token);
    assert_ne!(stored.refresh_digest, issued.tokens.refresh_token);
    assert_eq!(stored.access_digest.len(), 64);
}

#[tokio::test]
async fn test_revocation_is_terminal() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;

    app.manager.revoke_session(issued.session.id).await.unwrap();

    for _ in 0..3 {
        let err = app
            .manager
            .validate_access(&issued.tokens.access_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SessionInvalid);
        assert_eq!(err.public_message(), AUTH_FAILED_MESSAGE);
    }
    app.assert_projections_agree(user.id).await;
}

#[tokio::test]
async fn test_stored_access_expiry_overrides_credential() {
    let inner = Arc::new(MemorySessionStore::new());
    let app = helpers::TestApp::with_store(
        helpers::test_config(),
        inner.clone(),
        Arc::new(LapsedAccessStore { inner }),
    );
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;
    assert!(issued.tokens.expires_at > Utc::now());

    let err = app
        .manager
        .validate_access(&issued.tokens.access_token)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::SessionInvalid);
    assert_eq!(err.public_message(), AUTH_FAILED_MESSAGE);

    // The refresh horizon is still open, so the session can be renewed.
    let renewed = app
        .manager
        .refresh_session(&issued.tokens.refresh_token, "10.1.0.1", "client")
        .await
        .unwrap();
    assert_ne!(renewed.session.id, issued.session.id);
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;

    app.manager.revoke_session(issued.session.id).await.unwrap();
    let after_first = app.store.find_by_id(issued.session.id).await.unwrap();

    app.manager.revoke_session(issued.session.id).await.unwrap();
    let after_second = app.store.find_by_id(issued.session.id).await.unwrap();

    assert_eq!(after_first, after_second);
    app.manager.revoke_session(Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn test_refresh_is_single_use() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;

    let refreshed = app
        .manager
        .refresh_session(&issued.tokens.refresh_token, "10.1.0.2", "FleetHub-iOS/3.1")
        .await
        .unwrap();
    assert_ne!(refreshed.session.id, issued.session.id);
    assert_eq!(refreshed.session.source_address, "10.1.0.2");
    assert_eq!(refreshed.session.client_descriptor, "FleetHub-iOS/3.1");

    let old = app.store.find_by_id(issued.session.id).await.unwrap().unwrap();
    assert!(old.revoked);

    let err = app
        .manager
        .refresh_session(&issued.tokens.refresh_token, "10.1.0.2", "FleetHub-iOS/3.1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRefreshToken);

    let err = app
        .manager
        .validate_access(&issued.tokens.access_token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionInvalid);

    assert!(
        app.manager
            .validate_access(&refreshed.tokens.access_token)
            .await
            .is_ok()
    );
    app.assert_projections_agree(user.id).await;
}

#[tokio::test]
async fn test_concurrent_refresh_succeeds_once() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;
    let token = issued.tokens.refresh_token.clone();

    let (a, b) = tokio::join!(
        app.manager.refresh_session(&token, "10.1.0.2", "client-a"),
        app.manager.refresh_session(&token, "10.1.0.3", "client-b"),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    assert_eq!(app.manager.list_active(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_access_token_cannot_refresh() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;

    let err = app
        .manager
        .refresh_session(&issued.tokens.access_token, "10.1.0.1", "client")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRefreshToken);

    let err = app
        .manager
        .validate_access(&issued.tokens.refresh_token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Malformed);
}

#[tokio::test]
async fn test_refresh_for_removed_user_fails() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let issued = app.login(&user, "10.1.0.1").await;
    app.users.remove(user.id).await;

    let err = app
        .manager
        .refresh_session(&issued.tokens.refresh_token, "10.1.0.1", "client")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRefreshToken);
}

#[tokio::test]
async fn test_foreign_signature_rejected() {
    let app = helpers::TestApp::new();
    let mut other_config = helpers::test_config();
    other_config.auth.jwt_secret = "some-other-deployment".to_string();
    let other = helpers::TestApp::with_config(other_config);

    let user = other.create_user("driver@fleet.example").await;
    let issued = other.login(&user, "10.1.0.1").await;

    let err = app
        .manager
        .validate_access(&issued.tokens.access_token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSignature);
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_revoke_all_sessions() {
    let app = helpers::TestApp::new();
    let user = app.create_user("driver@fleet.example").await;
    let first = app.login(&user, "10.1.0.1").await;
    let second = app.login(&user, "10.1.0.2").await;

    assert_eq!(app.manager.revoke_all_sessions(user.id).await.unwrap(), 2);
    assert_eq!(app.manager.revoke_all_sessions(user.id).await.unwrap(), 0);

    for token in [&first.tokens.access_token, &second.tokens.access_token] {
        let err = app.manager.validate_access(token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::SessionInvalid);
    }
    app.assert_projections_agree(user.id).await;
}
