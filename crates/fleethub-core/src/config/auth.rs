//! Authentication configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Credential signing and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl AuthConfig {
    /// Access credential lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_ttl_minutes as i64)
    }

    /// Refresh credential lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::hours(self.refresh_ttl_hours as i64)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            leeway_seconds: default_leeway(),
            issuer: default_issuer(),
        }
    }
}

fn default_jwt_secret() -> String {
    super::PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    168
}

fn default_leeway() -> u64 {
    5
}

fn default_issuer() -> String {
    "fleethub".to_string()
}
