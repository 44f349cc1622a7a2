//! Eviction notifications.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use fleethub_core::result::AppResult;

/// Tells a user that older sessions were evicted by a new login.
///
/// The address and client fields describe the login that caused the
/// eviction, not the evicted sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionNotice {
    /// The affected user.
    pub user_id: Uuid,
    /// Sessions revoked to make room.
    pub evicted_session_ids: Vec<Uuid>,
    /// The session admitted in their place.
    pub new_session_id: Uuid,
    /// Address of the new login.
    pub source_address: String,
    /// Client descriptor of the new login.
    pub client_descriptor: String,
    /// When the eviction happened.
    pub occurred_at: DateTime<Utc>,
}

/// Delivers eviction notices to the user.
#[async_trait]
pub trait EvictionNotifier: Send + Sync + std::fmt::Debug {
    /// Deliver one notice.
    async fn notify_eviction(&self, notice: &EvictionNotice) -> AppResult<()>;
}

/// Notifier that only writes a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEvictionNotifier;

#[async_trait]
impl EvictionNotifier for LogEvictionNotifier {
    async fn notify_eviction(&self, notice: &EvictionNotice) -> AppResult<()> {
        info!(
            user_id = %notice.user_id,
            evicted = notice.evicted_session_ids.len(),
            new_session_id = %notice.new_session_id,
            source_address = %notice.source_address,
            client = %notice.client_descriptor,
            "Sessions evicted by new login"
        );
        Ok(())
    }
}

/// Deliver `notice` in the background, logging any failure.
pub fn dispatch_eviction(
    notifier: Arc<dyn EvictionNotifier>,
    notice: EvictionNotice,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify_eviction(&notice).await {
            warn!(
                user_id = %notice.user_id,
                new_session_id = %notice.new_session_id,
                error = %e,
                "Failed to deliver eviction notice"
            );
        }
    })
}
