//! Session lifecycle manager: issue, refresh, validate, and revoke.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use fleethub_core::config::{SecurityConfig, SessionConfig};
use fleethub_core::error::{AppError, ErrorKind};
use fleethub_core::events::SessionEvent;
use fleethub_core::result::AppResult;
use fleethub_core::types::SessionLimit;
use fleethub_entity::security::SessionDashboard;
use fleethub_entity::session::{Admission, IssuedTokens, NewSession, Session, TOKEN_TYPE_BEARER};
use fleethub_entity::user::{AuthUser, ResolvedIdentity};

use crate::directory::UserDirectory;
use crate::jwt::{JwtDecoder, JwtEncoder, token_digest};
use crate::limiter::SessionLimiter;
use crate::monitor::SecurityMonitor;
use crate::notify::{AuditSink, EvictionNotice, EvictionNotifier, dispatch_eviction, emit};

use super::store::SessionStore;

/// Result of a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedSession {
    /// Credentials returned to the client.
    pub tokens: IssuedTokens,
    /// The session they are bound to.
    pub session: Session,
    /// Sessions revoked to stay under the cap.
    pub evicted: Vec<Uuid>,
}

/// Manages the complete session lifecycle.
///
/// Storage is the authority on session state: a credential with a valid
/// signature is still rejected once its session is revoked or past its
/// stored horizon.
#[derive(Clone)]
pub struct SessionManager {
    /// JWT encoder for credential generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for credential validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Session persistence.
    session_store: Arc<dyn SessionStore>,
    /// Per-user session cap.
    session_limiter: SessionLimiter,
    /// Metrics, alerts, and dashboards.
    security_monitor: SecurityMonitor,
    /// User lookup for refresh.
    users: Arc<dyn UserDirectory>,
    /// Eviction notification channel.
    notifier: Arc<dyn EvictionNotifier>,
    /// Audit trail.
    audit: Arc<dyn AuditSink>,
    /// Session configuration.
    session_config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_config", &self.session_config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        session_store: Arc<dyn SessionStore>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn EvictionNotifier>,
        audit: Arc<dyn AuditSink>,
        session_config: SessionConfig,
        security_config: SecurityConfig,
    ) -> Self {
        let limit = SessionLimit::from(session_config.max_sessions_per_user);
        Self {
            session_limiter: SessionLimiter::new(Arc::clone(&session_store)),
            security_monitor: SecurityMonitor::new(
                Arc::clone(&session_store),
                security_config,
                limit,
            ),
            jwt_encoder,
            jwt_decoder,
            session_store,
            users,
            notifier,
            audit,
            session_config,
        }
    }

    /// The security monitor sharing this manager's store.
    pub fn monitor(&self) -> &SecurityMonitor {
        &self.security_monitor
    }

    /// Issues a credential pair and a new session for an authenticated user.
    ///
    /// 1. Queue behind other logins of the same user in this process
    /// 2. Sign the pair
    /// 3. Admit the session, revoking the oldest sessions over the cap in
    ///    the same unit of work
    /// 4. Notify and audit after the write commits
    ///
    /// A digest collision is retried with fresh credentials.
    pub async fn issue_session(
        &self,
        user: &AuthUser,
        source_address: &str,
        client_descriptor: &str,
    ) -> AppResult<IssuedSession> {
        let guard = self.session_limiter.lock_user(user.id).await;

        let mut attempt = 0;
        let (Admission { session, evicted }, tokens) = loop {
            attempt += 1;

            let pair = self.jwt_encoder.issue_pair(user)?;
            let new_session = NewSession {
                id: Uuid::now_v7(),
                user_id: user.id,
                access_digest: token_digest(&pair.access_token),
                refresh_digest: token_digest(&pair.refresh_token),
                source_address: source_address.to_string(),
                client_descriptor: client_descriptor.to_string(),
                access_expires_at: pair.access_expires_at,
                refresh_expires_at: pair.refresh_expires_at,
            };

            let written = self
                .session_limiter
                .admit(new_session, self.session_config.max_sessions_per_user)
                .await;

            match written {
                Ok(admission) => {
                    let expires_in = (pair.access_expires_at - Utc::now()).num_seconds().max(0);
                    let tokens = IssuedTokens {
                        access_token: pair.access_token,
                        refresh_token: pair.refresh_token,
                        token_type: TOKEN_TYPE_BEARER.to_string(),
                        expires_in,
                        expires_at: pair.access_expires_at,
                    };
                    break (admission, tokens);
                }
                Err(e)
                    if e.kind == ErrorKind::Conflict
                        && attempt < self.session_config.issue_attempts =>
                {
                    warn!(
                        user_id = %user.id,
                        attempt = attempt,
                        "Credential digest collision, reissuing"
                    );
                }
                Err(e) => {
                    error!(user_id = %user.id, error = %e, "Failed to create session");
                    return Err(e);
                }
            }
        };
        drop(guard);

        info!(
            user_id = %user.id,
            session_id = %session.id,
            evicted = evicted.len(),
            "Session issued"
        );

        emit(
            Arc::clone(&self.audit),
            Some(user.id),
            SessionEvent::Created {
                session_id: session.id,
                user_id: user.id,
                source_address: session.source_address.clone(),
            },
        );

        if !evicted.is_empty() {
            for evicted_id in &evicted {
                emit(
                    Arc::clone(&self.audit),
                    Some(user.id),
                    SessionEvent::Evicted {
                        session_id: *evicted_id,
                        user_id: user.id,
                        replaced_by: session.id,
                    },
                );
            }
            dispatch_eviction(
                Arc::clone(&self.notifier),
                EvictionNotice {
                    user_id: user.id,
                    evicted_session_ids: evicted.clone(),
                    new_session_id: session.id,
                    source_address: session.source_address.clone(),
                    client_descriptor: session.client_descriptor.clone(),
                    occurred_at: Utc::now(),
                },
            );
        }

        Ok(IssuedSession {
            tokens,
            session,
            evicted,
        })
    }

    /// Exchanges a refresh credential for a new session.
    ///
    /// The presented session is revoked before the new one is issued, so a
    /// refresh credential works at most once even under concurrent use.
    pub async fn refresh_session(
        &self,
        refresh_token: &str,
        source_address: &str,
        client_descriptor: &str,
    ) -> AppResult<IssuedSession> {
        let claims = self.jwt_decoder.decode_refresh(refresh_token).map_err(|e| {
            debug!(kind = %e.kind(), error = %e, "Refresh credential rejected before lookup");
            AppError::invalid_refresh_token(e.to_string())
        })?;
        let user_id = claims.user_id();
        let digest = token_digest(refresh_token);

        let session = self
            .with_deadline(
                self.session_config.lookup_timeout(),
                self.session_store.find_by_refresh_digest(&digest, user_id),
            )
            .await?
            .ok_or_else(|| {
                debug!(user_id = %user_id, "Refresh credential matches no session");
                AppError::invalid_refresh_token("Refresh token not recognised")
            })?;

        if !session.is_active_at(Utc::now()) {
            debug!(
                user_id = %user_id,
                session_id = %session.id,
                revoked = session.revoked,
                "Refresh credential belongs to an ended session"
            );
            return Err(AppError::invalid_refresh_token("Session is no longer active"));
        }

        if !self.session_store.revoke(session.id).await? {
            debug!(
                user_id = %user_id,
                session_id = %session.id,
                "Refresh credential already consumed"
            );
            return Err(AppError::invalid_refresh_token("Refresh token already used"));
        }

        let user = self.users.find_user(user_id).await?.ok_or_else(|| {
            debug!(user_id = %user_id, "Refresh for unknown or disabled user");
            AppError::invalid_refresh_token("User is not available")
        })?;

        let issued = self
            .issue_session(&user, source_address, client_descriptor)
            .await?;

        info!(
            user_id = %user_id,
            previous_session_id = %session.id,
            session_id = %issued.session.id,
            "Session refreshed"
        );
        emit(
            Arc::clone(&self.audit),
            Some(user_id),
            SessionEvent::Refreshed {
                previous_session_id: session.id,
                session_id: issued.session.id,
                user_id,
            },
        );

        Ok(issued)
    }

    /// Validates an access credential using the configured lookup deadline.
    pub async fn validate_access(&self, access_token: &str) -> AppResult<ResolvedIdentity> {
        self.validate_access_with_deadline(access_token, self.session_config.lookup_timeout())
            .await
    }

    /// Validates an access credential and resolves the identity it vouches for.
    ///
    /// Signature and embedded expiry are checked first; the session behind
    /// the credential must then still accept access in storage.
    pub async fn validate_access_with_deadline(
        &self,
        access_token: &str,
        deadline: StdDuration,
    ) -> AppResult<ResolvedIdentity> {
        let claims = self.jwt_decoder.decode_access(access_token).map_err(|e| {
            debug!(kind = %e.kind(), error = %e, "Access credential rejected before lookup");
            AppError::from(e)
        })?;
        let digest = token_digest(access_token);

        let session = self
            .with_deadline(deadline, self.session_store.find_by_access_digest(&digest))
            .await?;

        let session = match session {
            Some(session) if session.user_id != claims.sub => {
                warn!(
                    session_id = %session.id,
                    subject = %claims.sub,
                    "Access credential subject does not own its session"
                );
                return Err(AppError::session_invalid("Session does not match credential"));
            }
            Some(session) if session.accepts_access_at(Utc::now()) => session,
            Some(session) => {
                debug!(
                    session_id = %session.id,
                    revoked = session.revoked,
                    "Access credential belongs to an ended session"
                );
                return Err(AppError::session_invalid("Session is no longer valid"));
            }
            None => {
                debug!(user_id = %claims.sub, "Access credential matches no session");
                return Err(AppError::session_invalid("Session not found"));
            }
        };

        Ok(claims.identity(session.id)?)
    }

    /// Revokes one session. Revoking an ended or unknown session is a no-op.
    pub async fn revoke_session(&self, session_id: Uuid) -> AppResult<()> {
        if self.session_store.revoke(session_id).await? {
            info!(session_id = %session_id, "Session revoked");
            emit(
                Arc::clone(&self.audit),
                None,
                SessionEvent::Revoked {
                    session_id,
                    reason: "logout".to_string(),
                },
            );
        } else {
            debug!(session_id = %session_id, "Session already revoked or absent");
        }
        Ok(())
    }

    /// Revokes every active session of a user. Returns how many were revoked.
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> AppResult<u64> {
        let count = self.session_store.revoke_all(user_id).await?;
        info!(user_id = %user_id, count = count, "Revoked all user sessions");
        if count > 0 {
            emit(
                Arc::clone(&self.audit),
                Some(user_id),
                SessionEvent::RevokedAll { user_id, count },
            );
        }
        Ok(count)
    }

    /// A user's active sessions, newest first.
    pub async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        self.session_store.list_active(user_id).await
    }

    /// Composite read-only view of a user's sessions.
    pub async fn dashboard(&self, user_id: Uuid) -> AppResult<SessionDashboard> {
        self.security_monitor.dashboard(user_id).await
    }

    async fn with_deadline<T>(
        &self,
        deadline: StdDuration,
        lookup: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(deadline, lookup).await {
            Ok(result) => result,
            Err(_) => {
                warn!(deadline_ms = deadline.as_millis() as u64, "Session lookup timed out");
                Err(AppError::timeout("Session lookup exceeded its deadline"))
            }
        }
    }
}
