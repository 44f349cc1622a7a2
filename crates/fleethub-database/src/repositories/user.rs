//! Read-only user lookup used when issuing credentials.
//!
//! User CRUD lives outside the session service; this repository only reads
//! the columns needed to fill credential claims.

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use fleethub_core::result::AppResult;
use fleethub_entity::user::{AuthUser, UserRole};

use super::map_read_error;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    company_id: Option<Uuid>,
}

/// Repository for looking up users by ID.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an enabled user by primary key.
    pub async fn find_auth_user(&self, id: Uuid) -> AppResult<Option<AuthUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, role, company_id FROM users WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_read_error("Failed to find user by id", e))?;

        row.map(|row| {
            Ok(AuthUser {
                id: row.id,
                email: row.email,
                role: row.role.parse::<UserRole>()?,
                company_id: row.company_id,
            })
        })
        .transpose()
    }
}
