//! Read-only security metrics and alerts over a user's sessions.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use fleethub_core::config::SecurityConfig;
use fleethub_core::result::AppResult;
use fleethub_core::types::SessionLimit;
use fleethub_entity::security::{
    DashboardWarnings, SecurityAlert, SessionDashboard, SessionMetrics,
};
use fleethub_entity::session::Session;

use crate::session::store::SessionStore;

/// Derives metrics, alerts, and the dashboard view. Never mutates state.
#[derive(Debug, Clone)]
pub struct SecurityMonitor {
    /// Session persistence.
    store: Arc<dyn SessionStore>,
    /// Alert thresholds.
    config: SecurityConfig,
    /// Session cap used for the approaching-limit warning.
    limit: SessionLimit,
}

impl SecurityMonitor {
    /// Creates a new security monitor.
    pub fn new(store: Arc<dyn SessionStore>, config: SecurityConfig, limit: SessionLimit) -> Self {
        Self {
            store,
            config,
            limit,
        }
    }

    /// Aggregate metrics over every session on record for the user.
    pub async fn metrics(&self, user_id: Uuid) -> AppResult<SessionMetrics> {
        let sessions = self.store.list_by_user(user_id, None).await?;
        Ok(compute_metrics(&sessions, Utc::now()))
    }

    /// Alerts derived from the user's active sessions.
    pub async fn detect(&self, user_id: Uuid) -> AppResult<Vec<SecurityAlert>> {
        let active = self.store.list_active(user_id).await?;
        let alerts = detect_alerts(&active, &self.config);
        log_alerts(user_id, &alerts);
        Ok(alerts)
    }

    /// Composite read-only view of the user's sessions.
    pub async fn dashboard(&self, user_id: Uuid) -> AppResult<SessionDashboard> {
        let (all, active) = tokio::try_join!(
            self.store.list_by_user(user_id, None),
            self.store.list_active(user_id),
        )?;

        let metrics = compute_metrics(&all, Utc::now());
        let alerts = detect_alerts(&active, &self.config);
        log_alerts(user_id, &alerts);

        let recent_history = all
            .into_iter()
            .take(self.config.recent_history_limit as usize)
            .collect();

        let warnings = DashboardWarnings {
            approaching_limit: self.limit.is_approached_by(active.len()),
            has_security_concerns: !alerts.is_empty(),
        };

        Ok(SessionDashboard {
            metrics,
            active_sessions: active,
            alerts,
            recent_history,
            warnings,
        })
    }
}

fn log_alerts(user_id: Uuid, alerts: &[SecurityAlert]) {
    for alert in alerts {
        warn!(
            user_id = %user_id,
            alert = %alert.kind,
            description = %alert.description,
            "Security alert raised"
        );
    }
}

/// Metrics over `sessions` as of `now`.
///
/// Counts and distinct addresses consider only active sessions; durations
/// cover every session given.
pub fn compute_metrics(sessions: &[Session], now: DateTime<Utc>) -> SessionMetrics {
    let active: Vec<&Session> = sessions.iter().filter(|s| s.is_active_at(now)).collect();
    let unique_addresses = active
        .iter()
        .map(|s| s.source_address.as_str())
        .collect::<HashSet<_>>()
        .len();

    let total_duration_minutes: i64 = sessions.iter().map(|s| s.duration_minutes(now)).sum();
    let average_duration_minutes = if sessions.is_empty() {
        0.0
    } else {
        total_duration_minutes as f64 / sessions.len() as f64
    };

    SessionMetrics {
        active_sessions: active.len(),
        total_sessions: sessions.len(),
        unique_addresses,
        total_duration_minutes,
        average_duration_minutes,
    }
}

/// Alerts for an active session set. Both checks are independent.
pub fn detect_alerts(active: &[Session], config: &SecurityConfig) -> Vec<SecurityAlert> {
    let mut alerts = Vec::new();

    let addresses = active
        .iter()
        .map(|s| s.source_address.as_str())
        .collect::<HashSet<_>>()
        .len();
    if addresses > config.max_distinct_addresses {
        alerts.push(SecurityAlert::multiple_locations(addresses));
    }

    if active.len() > config.max_concurrent_devices {
        alerts.push(SecurityAlert::too_many_devices(active.len()));
    }

    alerts
}
