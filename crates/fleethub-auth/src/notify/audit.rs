//! Audit trail for session lifecycle events.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use fleethub_core::events::{DomainEvent, SessionEvent};
use fleethub_core::result::AppResult;

/// Records session lifecycle events.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug {
    /// Record one event.
    async fn record(&self, event: &DomainEvent) -> AppResult<()>;
}

/// Sink that writes each event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: &DomainEvent) -> AppResult<()> {
        let payload = serde_json::to_string(&event.payload)?;
        info!(
            target: "fleethub::audit",
            event_id = %event.id,
            event = event.payload.name(),
            actor_id = ?event.actor_id,
            payload = %payload,
            "Session audit event"
        );
        Ok(())
    }
}

/// Record `payload` in the background, logging any failure.
pub fn emit(sink: Arc<dyn AuditSink>, actor_id: Option<Uuid>, payload: SessionEvent) -> JoinHandle<()> {
    let event = DomainEvent::new(actor_id, payload);
    tokio::spawn(async move {
        if let Err(e) = sink.record(&event).await {
            warn!(
                event = event.payload.name(),
                error = %e,
                "Failed to record audit event"
            );
        }
    })
}
