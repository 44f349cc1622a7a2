//! Session metrics and the composite dashboard view.

use serde::{Deserialize, Serialize};

use super::alert::SecurityAlert;
use crate::session::Session;

/// Aggregates over one user's sessions, computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Sessions that are currently active.
    pub active_sessions: usize,
    /// Sessions of any status still on record.
    pub total_sessions: usize,
    /// Distinct source addresses among active sessions.
    pub unique_addresses: usize,
    /// Summed session lifetime in minutes.
    pub total_duration_minutes: i64,
    /// Mean session lifetime in minutes, 0 when there are no sessions.
    pub average_duration_minutes: f64,
}

/// Flags surfaced alongside the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardWarnings {
    /// The next login would hit the session cap.
    pub approaching_limit: bool,
    /// At least one alert fired.
    pub has_security_concerns: bool,
}

/// Read-only composite view of a user's sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDashboard {
    /// Aggregate metrics.
    pub metrics: SessionMetrics,
    /// Active sessions, newest first.
    pub active_sessions: Vec<Session>,
    /// Alerts derived from the active sessions.
    pub alerts: Vec<SecurityAlert>,
    /// Most recent sessions of any status, newest first.
    pub recent_history: Vec<Session>,
    /// Warning flags.
    pub warnings: DashboardWarnings,
}
