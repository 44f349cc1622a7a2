//! User lookup used when issuing credentials.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use fleethub_core::result::AppResult;
use fleethub_database::repositories::user::UserRepository;
use fleethub_entity::user::AuthUser;

/// Resolves a user ID to the identity embedded in access credentials.
///
/// Returns `None` for unknown or disabled users.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Find an enabled user.
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<AuthUser>>;
}

/// Directory backed by the `users` table.
#[derive(Debug, Clone)]
pub struct DbUserDirectory {
    repo: Arc<UserRepository>,
}

impl DbUserDirectory {
    /// Creates a new database-backed directory.
    pub fn new(repo: Arc<UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserDirectory for DbUserDirectory {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<AuthUser>> {
        self.repo.find_auth_user(user_id).await
    }
}

/// Directory held in memory, for single-node setups and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, AuthUser>>>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub async fn insert(&self, user: AuthUser) {
        self.users.write().await.insert(user.id, user);
    }

    /// Removes a user, as if disabled.
    pub async fn remove(&self, user_id: Uuid) -> Option<AuthUser> {
        self.users.write().await.remove(&user_id)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<AuthUser>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}
