//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod database;
pub mod logging;
pub mod security;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::security::SecurityConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Placeholder signing key shipped in the defaults. Rejected outside development.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Credential signing and lifetime settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session cap, retention, and sweep settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Security alert thresholds.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `FLEETHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration starting from an explicit base file.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let base = base.strip_suffix(".toml").unwrap_or(base);

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FLEETHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate(env)?;
        Ok(loaded)
    }

    /// Reject configurations the session core cannot run safely with.
    pub fn validate(&self, env: &str) -> Result<(), AppError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }

        if self.auth.jwt_secret == PLACEHOLDER_JWT_SECRET {
            if env == "development" || env == "test" {
                tracing::warn!("Using the placeholder JWT secret; set auth.jwt_secret");
            } else {
                return Err(AppError::configuration(format!(
                    "auth.jwt_secret must be set for environment '{env}'"
                )));
            }
        }

        if self.session.max_sessions_per_user == 0 {
            return Err(AppError::configuration(
                "session.max_sessions_per_user must be at least 1",
            ));
        }

        if self.auth.refresh_ttl() <= self.auth.access_ttl() {
            return Err(AppError::configuration(
                "auth.refresh_ttl_hours must outlast auth.access_ttl_minutes",
            ));
        }

        if self.session.sweep_batch_size == 0 {
            return Err(AppError::configuration(
                "session.sweep_batch_size must be at least 1",
            ));
        }

        Ok(())
    }
}
