//! HTTP rendering of application errors.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use brokerdesk_shared::{AppError, types::envelope::ErrorBody};
use sea_orm::DbErr;
use tracing::error;

/// Error returned by every handler; renders the error envelope.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// The caller lacks the permission for the operation.
    #[must_use]
    pub fn forbidden() -> Self {
        Self(AppError::no_permission())
    }

    /// Input failed validation.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// A referenced row does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(AppError::NotFound(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() || status == StatusCode::CONFLICT {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
        }
        let body = ErrorBody::new(self.0.error_code(), self.0.public_message());
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

macro_rules! via_app_error {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self(AppError::from(err))
                }
            }
        )+
    };
}

via_app_error!(
    AppError,
    brokerdesk_shared::JwtError,
    brokerdesk_shared::EmailError,
    brokerdesk_core::auth::PasswordError,
    brokerdesk_core::validation::ValidationError,
    brokerdesk_core::permission::UnknownLevel,
    brokerdesk_core::invoice::InvoiceError,
    brokerdesk_core::dashboard::DashboardError,
    brokerdesk_db::repositories::RoleError,
    brokerdesk_db::repositories::UserError,
    brokerdesk_db::repositories::CompanyError,
    brokerdesk_db::repositories::TransactionError,
    brokerdesk_db::repositories::InvoiceRepoError,
);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_forbidden_envelope() {
        let (status, body) = render(ApiError::forbidden()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_missing_rows_are_bad_requests() {
        let (status, body) = render(ApiError::not_found("The role does not exist")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "The role does not exist");
    }

    #[tokio::test]
    async fn test_database_detail_is_hidden() {
        let err = ApiError::from(DbErr::Custom("relation users is missing".to_string()));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "An unexpected error occurred");
    }
}
