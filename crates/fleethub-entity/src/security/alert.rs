//! Security alerts raised from the active session set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a [`SecurityAlert`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Active sessions originate from too many distinct addresses.
    MultipleLocations,
    /// Too many concurrently active sessions.
    TooManyDevices,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleLocations => write!(f, "multiple_locations"),
            Self::TooManyDevices => write!(f, "too_many_devices"),
        }
    }
}

/// How urgent an alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Informational.
    Low,
    /// Worth a look.
    Medium,
    /// Likely compromise.
    High,
}

/// An ephemeral finding; recomputed on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAlert {
    /// Alert kind.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Alert severity.
    pub severity: AlertSeverity,
    /// Human-readable description.
    pub description: String,
}

impl SecurityAlert {
    /// Alert for sessions spread across `count` distinct addresses.
    pub fn multiple_locations(count: usize) -> Self {
        Self {
            kind: AlertKind::MultipleLocations,
            severity: AlertSeverity::Medium,
            description: format!("Active sessions from {count} different IP addresses"),
        }
    }

    /// Alert for `count` concurrently active sessions.
    pub fn too_many_devices(count: usize) -> Self {
        Self {
            kind: AlertKind::TooManyDevices,
            severity: AlertSeverity::High,
            description: format!("{count} active sessions detected"),
        }
    }
}
