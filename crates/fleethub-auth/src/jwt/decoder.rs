//! JWT token validation.
//!
//! Decoding proves only that a credential was issued by this service and has
//! not passed its embedded expiry. Whether the session behind it is still
//! alive is a storage question answered by the session manager.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use fleethub_core::config::AuthConfig;

use super::claims::{Claims, TokenType};
use super::error::TokenError;

/// Validates JWT signatures, expiry, and token type.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verifies signature and expiry, returning the claims of either token type.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Decodes a token and requires it to be an access token.
    pub fn decode_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Access)
    }

    /// Decodes a token and requires it to be a refresh token.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Refresh)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType { expected });
        }
        Ok(claims)
    }
}
