//! Read-only security views derived from a user's sessions.

pub mod alert;
pub mod dashboard;

pub use alert::{AlertKind, AlertSeverity, SecurityAlert};
pub use dashboard::{DashboardWarnings, SessionDashboard, SessionMetrics};
