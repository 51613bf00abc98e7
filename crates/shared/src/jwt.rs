//! JWT token generation and validation.
//!
//! Access and refresh tokens share one HS256 secret and differ by `scope`.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::{Claims, TokenScope};
use crate::config::JwtSettings;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expires_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expires_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_secs: 900,
            refresh_token_expires_secs: 604_800,
        }
    }
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            access_token_expires_secs: settings.access_token_expiry_secs,
            refresh_token_expires_secs: settings.refresh_token_expiry_secs,
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token has expired.
    #[error("Token expired")]
    Expired,

    /// Token is malformed, badly signed, or has a bad subject.
    #[error("Invalid token")]
    Invalid,

    /// Token was issued for another purpose.
    #[error("Scope for the token is invalid")]
    WrongScope,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expires_secs", &self.config.access_token_expires_secs)
            .field("refresh_token_expires_secs", &self.config.refresh_token_expires_secs)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn issue(&self, user_id: i64, scope: TokenScope, lifetime_secs: i64) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::seconds(lifetime_secs);
        let claims = Claims::new(user_id, scope, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Generates an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.issue(user_id, TokenScope::Access, self.config.access_token_expires_secs)
    }

    /// Generates a refresh token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_refresh_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.issue(user_id, TokenScope::Refresh, self.config.refresh_token_expires_secs)
    }

    /// Decodes a token and checks its signature, expiry, and scope.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired`, `JwtError::Invalid`, or `JwtError::WrongScope`.
    pub fn validate_token(&self, token: &str, expected: TokenScope) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })?;

        if claims.scope != expected {
            return Err(JwtError::WrongScope);
        }
        if claims.user_id().is_none() {
            return Err(JwtError::Invalid);
        }
        Ok(claims)
    }

    /// Validates an access token and returns the user ID it was issued for.
    ///
    /// # Errors
    ///
    /// See [`JwtService::validate_token`].
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, TokenScope::Access)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Fails when the refresh token is invalid, expired, or not a refresh token.
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<String, JwtError> {
        let claims = self.validate_token(refresh_token, TokenScope::Refresh)?;
        let user_id = claims.user_id().ok_or(JwtError::Invalid)?;
        self.generate_access_token(user_id)
    }

    /// Returns the access token lifetime in seconds.
    #[must_use]
    pub const fn access_token_expires_in(&self) -> i64 {
        self.config.access_token_expires_secs
    }
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
