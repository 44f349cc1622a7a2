//! Session management configuration.

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Session cap, retention, and maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent active sessions per user.
    #[serde(default = "default_max_sessions")]
    pub max_sessions_per_user: u32,
    /// Days a session row is kept after its refresh horizon passes.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    /// Cron expression (with seconds) for the maintenance sweep.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,
    /// Maximum rows deleted by one sweep invocation.
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: u32,
    /// Default deadline for storage lookups during validation, in milliseconds.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,
    /// Attempts at issuing fresh credentials when a digest collides.
    #[serde(default = "default_issue_attempts")]
    pub issue_attempts: u32,
}

impl SessionConfig {
    /// Retention window applied by the maintenance sweep.
    pub fn retention(&self) -> Duration {
        Duration::days(self.retention_days as i64)
    }

    /// Default storage lookup deadline.
    pub fn lookup_timeout(&self) -> StdDuration {
        StdDuration::from_millis(self.lookup_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions_per_user: default_max_sessions(),
            retention_days: default_retention_days(),
            sweep_schedule: default_sweep_schedule(),
            sweep_batch_size: default_sweep_batch_size(),
            lookup_timeout_ms: default_lookup_timeout(),
            issue_attempts: default_issue_attempts(),
        }
    }
}

fn default_max_sessions() -> u32 {
    3
}

fn default_retention_days() -> u64 {
    7
}

fn default_sweep_schedule() -> String {
    "0 0 * * * *".to_string()
}

fn default_sweep_batch_size() -> u32 {
    1000
}

fn default_lookup_timeout() -> u64 {
    5000
}

fn default_issue_attempts() -> u32 {
    3
}
