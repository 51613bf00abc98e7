//! Application-wide error types.

use thiserror::Error;

use crate::email::EmailError;
use crate::jwt::JwtError;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// The display text of each variant is what clients see as `message`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, expired, or malformed credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller lacks the permission for the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input failed a validation rule.
    #[error("{0}")]
    Validation(String),

    /// Business rule violation (settled period, role still in use, ...).
    #[error("{0}")]
    BusinessRule(String),

    /// Duplicate entry.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Mail relay or another external dependency failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    ///
    /// Missing resources and duplicates are reported as 400 like any other
    /// rejected input; unexpected storage or mail failures as 409.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) | Self::Validation(_) | Self::BusinessRule(_) | Self::Conflict(_) => {
                400
            }
            Self::Database(_) | Self::ExternalService(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message shown to clients.
    ///
    /// Storage and internal failures are replaced by a generic text; their
    /// detail only goes to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => {
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Shorthand for the permission error used by every guarded route.
    #[must_use]
    pub fn no_permission() -> Self {
        Self::Forbidden("You do not have permission".to_string())
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingError(detail) => Self::Internal(detail),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
