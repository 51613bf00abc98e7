//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Purpose of a token; an access token cannot be used to refresh and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    /// Short-lived token sent with every request.
    #[serde(rename = "access_token")]
    Access,
    /// Long-lived token exchanged for a new access token.
    #[serde(rename = "refresh_token")]
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as a decimal string).
    pub sub: String,
    /// Token scope.
    pub scope: TokenScope,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: i64, scope: TokenScope, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            scope,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims, if the subject is numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Token pair returned after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
}

/// Fresh access token returned by the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Access token (short-lived).
    pub access_token: String,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_fields() {
        let expires_at = Utc::now() + Duration::hours(1);
        let before = Utc::now().timestamp();
        let claims = Claims::new(42, TokenScope::Access, expires_at);

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.scope, TokenScope::Access);
        assert!(claims.iat >= before);
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_scope_wire_names() {
        let claims = Claims::new(7, TokenScope::Refresh, Utc::now());
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["scope"], "refresh_token");
        assert_eq!(json["sub"], "7");
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "someone".to_string(),
            scope: TokenScope::Access,
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
