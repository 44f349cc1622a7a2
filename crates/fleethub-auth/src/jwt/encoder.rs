//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use fleethub_core::config::AuthConfig;
use fleethub_entity::user::AuthUser;

use super::claims::{Claims, TokenType};
use super::error::TokenError;

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token lifetime.
    access_ttl: Duration,
    /// Refresh token lifetime.
    refresh_ttl: Duration,
    /// Value written to the `iss` claim.
    issuer: String,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
            issuer: config.issuer.clone(),
        }
    }

    /// Signs an access token carrying the user's identity claims.
    pub fn issue_access(
        &self,
        user: &AuthUser,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user.id,
            email: Some(user.email.clone()),
            role: Some(user.role),
            tenant: user.company_id,
            iss: self.issuer.clone(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
        };
        self.sign(&claims)
    }

    /// Signs a refresh token carrying only the subject.
    pub fn issue_refresh(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            email: None,
            role: None,
            tenant: None,
            iss: self.issuer.clone(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
        };
        self.sign(&claims)
    }

    /// Generates a new access + refresh pair using the configured lifetimes.
    pub fn issue_pair(&self, user: &AuthUser) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let access_expires_at = now + self.access_ttl;
        let refresh_expires_at = now + self.refresh_ttl;

        Ok(TokenPair {
            access_token: self.issue_access(user, access_expires_at)?,
            refresh_token: self.issue_refresh(user.id, refresh_expires_at)?,
            access_expires_at,
            refresh_expires_at,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}
