//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles carried in access credentials.
///
/// The session core only transports the role; authorization rules live
/// elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform-wide administrator.
    SuperAdmin,
    /// Company administrator.
    Admin,
    /// Manages vehicles and teams of one company.
    FleetManager,
    /// Drives company vehicles.
    Driver,
    /// Read-only access.
    Viewer,
}

impl UserRole {
    /// Return the role as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::FleetManager => "fleet_manager",
            Self::Driver => "driver",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = fleethub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "fleet_manager" => Ok(Self::FleetManager),
            "driver" => Ok(Self::Driver),
            "viewer" => Ok(Self::Viewer),
            _ => Err(fleethub_core::AppError::new(
                fleethub_core::error::ErrorKind::Serialization,
                format!("Invalid user role: '{s}'"),
            )),
        }
    }
}
