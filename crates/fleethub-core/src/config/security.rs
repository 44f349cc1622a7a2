//! Security monitoring thresholds.

use serde::{Deserialize, Serialize};

/// Thresholds used to derive security alerts from the live session set.
///
/// Both checks are strict greater-than comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Distinct source addresses tolerated before `multiple_locations` fires.
    #[serde(default = "default_max_distinct_addresses")]
    pub max_distinct_addresses: usize,
    /// Concurrent active sessions tolerated before `too_many_devices` fires.
    #[serde(default = "default_max_concurrent_devices")]
    pub max_concurrent_devices: usize,
    /// Number of sessions (any status) shown in the dashboard history.
    #[serde(default = "default_recent_history_limit")]
    pub recent_history_limit: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_distinct_addresses: default_max_distinct_addresses(),
            max_concurrent_devices: default_max_concurrent_devices(),
            recent_history_limit: default_recent_history_limit(),
        }
    }
}

fn default_max_distinct_addresses() -> usize {
    2
}

fn default_max_concurrent_devices() -> usize {
    5
}

fn default_recent_history_limit() -> u32 {
    10
}
