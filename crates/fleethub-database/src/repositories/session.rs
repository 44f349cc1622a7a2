//! Session repository implementation.
//!
//! Every mutation touches `user_sessions` and `user_session_views` inside
//! one transaction, so the canonical row and its projection either change
//! together or not at all.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fleethub_core::error::AppError;
use fleethub_core::result::AppResult;
use fleethub_core::types::SessionLimit;
use fleethub_entity::session::{Admission, NewSession, Session, SessionProjection};

use super::{map_read_error, map_write_error};

const SESSION_COLUMNS: &str = "id, user_id, access_digest, refresh_digest, source_address, \
     client_descriptor, access_expires_at, refresh_expires_at, revoked, revoked_at, \
     created_at, updated_at";

const PROJECTION_COLUMNS: &str = "id, user_id, snapshot, active, created_at, updated_at";

/// Repository for session persistence on PostgreSQL.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_write_error("Failed to begin session transaction", e))
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| map_write_error("Failed to commit session transaction", e))
    }

    /// Insert a session and its projection.
    pub async fn create(&self, data: &NewSession) -> AppResult<Session> {
        let mut tx = self.begin().await?;
        let session = Self::insert_in(&mut tx, data).await?;
        Self::commit(tx).await?;
        Ok(session)
    }

    /// Admit `data` under `limit`, revoking the user's oldest active sessions
    /// to make room, in one transaction.
    ///
    /// A transaction-scoped advisory lock keyed by the user is taken before
    /// the active set is read, so concurrent admits for the same user from
    /// any process decide and write one after another. The active rows are
    /// also locked so a concurrent logout cannot interleave with eviction.
    pub async fn admit(&self, data: &NewSession, limit: SessionLimit) -> AppResult<Admission> {
        let mut tx = self.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(data.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("Failed to lock user session set", e))?;

        let now = Utc::now();
        let active: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM user_sessions \
             WHERE user_id = $1 AND revoked = FALSE AND refresh_expires_at > $2 \
             ORDER BY created_at ASC, id ASC \
             FOR UPDATE",
        )
        .bind(data.user_id)
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_read_error("Failed to read active sessions", e))?;

        let evicted: Vec<Uuid> = active
            .iter()
            .take(limit.evictions_needed(active.len()))
            .copied()
            .collect();
        for id in &evicted {
            Self::revoke_in(&mut tx, *id, now).await?;
        }

        let session = Self::insert_in(&mut tx, data).await?;
        Self::commit(tx).await?;
        Ok(Admission { session, evicted })
    }

    async fn insert_in(
        tx: &mut Transaction<'static, Postgres>,
        data: &NewSession,
    ) -> AppResult<Session> {
        let row = data.clone().into_session(Utc::now());

        let insert = format!(
            "INSERT INTO user_sessions ({SESSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {SESSION_COLUMNS}"
        );
        let session = sqlx::query_as::<_, Session>(&insert)
            .bind(row.id)
            .bind(row.user_id)
            .bind(&row.access_digest)
            .bind(&row.refresh_digest)
            .bind(&row.source_address)
            .bind(&row.client_descriptor)
            .bind(row.access_expires_at)
            .bind(row.refresh_expires_at)
            .bind(row.revoked)
            .bind(row.revoked_at)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_write_error("Failed to insert session", e))?;

        let projection = SessionProjection::from_session(&session);
        sqlx::query(
            "INSERT INTO user_session_views (id, user_id, snapshot, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(projection.id)
        .bind(projection.user_id)
        .bind(&projection.snapshot)
        .bind(projection.active)
        .bind(projection.created_at)
        .bind(projection.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_write_error("Failed to insert session projection", e))?;

        Ok(session)
    }

    async fn revoke_in(
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked = TRUE, revoked_at = $2, updated_at = $2 \
             WHERE id = $1 AND revoked = FALSE",
        )
        .bind(id)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_write_error("Failed to revoke session", e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let mirrored = sqlx::query(
            "UPDATE user_session_views SET active = FALSE, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_write_error("Failed to deactivate session projection", e))?;

        if mirrored.rows_affected() != 1 {
            return Err(AppError::persistence(format!(
                "Projection row missing for session {id}"
            )));
        }

        Ok(true)
    }

    /// Revoke one session. Returns `false` when it was already revoked or absent.
    pub async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.begin().await?;
        let changed = Self::revoke_in(&mut tx, id, Utc::now()).await?;
        Self::commit(tx).await?;
        Ok(changed)
    }

    /// Revoke every unrevoked session of a user. Returns how many changed.
    pub async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64> {
        let now = Utc::now();
        let mut tx = self.begin().await?;

        let ids: Vec<Uuid> = sqlx::query_scalar(
            "UPDATE user_sessions SET revoked = TRUE, revoked_at = $2, updated_at = $2 \
             WHERE user_id = $1 AND revoked = FALSE RETURNING id",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_write_error("Failed to revoke user sessions", e))?;

        if !ids.is_empty() {
            let mirrored = sqlx::query(
                "UPDATE user_session_views SET active = FALSE, updated_at = $2 WHERE id = ANY($1)",
            )
            .bind(&ids)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("Failed to deactivate session projections", e))?;

            if mirrored.rows_affected() != ids.len() as u64 {
                return Err(AppError::persistence(format!(
                    "Projection rows missing for user {user_id}: expected {}, updated {}",
                    ids.len(),
                    mirrored.rows_affected()
                )));
            }
        }

        Self::commit(tx).await?;
        Ok(ids.len() as u64)
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM user_sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error("Failed to find session", e))
    }

    /// Find a session by access credential digest.
    pub async fn find_by_access_digest(&self, digest: &str) -> AppResult<Option<Session>> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM user_sessions WHERE access_digest = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(digest)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error("Failed to find session by access digest", e))
    }

    /// Find a user's session by refresh credential digest.
    pub async fn find_by_refresh_digest(
        &self,
        digest: &str,
        user_id: Uuid,
    ) -> AppResult<Option<Session>> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE user_id = $1 AND refresh_digest = $2"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(digest)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error("Failed to find session by refresh digest", e))
    }

    /// Find the projection row of a session.
    pub async fn find_projection(&self, id: Uuid) -> AppResult<Option<SessionProjection>> {
        let query = format!("SELECT {PROJECTION_COLUMNS} FROM user_session_views WHERE id = $1");
        sqlx::query_as::<_, SessionProjection>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error("Failed to find session projection", e))
    }

    /// List a user's active sessions, newest first.
    pub async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions \
             WHERE user_id = $1 AND revoked = FALSE AND refresh_expires_at > $2 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error("Failed to list active sessions", e))
    }

    /// List a user's sessions of any status, newest first.
    pub async fn list_by_user(&self, user_id: Uuid, limit: Option<u32>) -> AppResult<Vec<Session>> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(limit.map(i64::from))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error("Failed to list sessions", e))
    }

    /// Hard-delete at most `limit` sessions whose refresh horizon is before `cutoff`.
    ///
    /// Projection rows go with them through `ON DELETE CASCADE`.
    pub async fn delete_expired(&self, cutoff: DateTime<Utc>, limit: u32) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM user_sessions WHERE id IN ( \
                SELECT id FROM user_sessions WHERE refresh_expires_at < $1 \
                ORDER BY refresh_expires_at ASC LIMIT $2 \
             )",
        )
        .bind(cutoff)
        .bind(i64::from(limit))
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to delete expired sessions", e))?;

        Ok(result.rows_affected())
    }
}
