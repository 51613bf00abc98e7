//! Public account flows: sign-up, e-mail verification, login, token refresh
//! and password reset.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use brokerdesk_core::auth::{hash_password, verify_password};
use brokerdesk_core::validation::{validate_email, validate_password, validate_person_name};
use brokerdesk_db::repositories::UserError;
use brokerdesk_db::{UserRepository, entities::sea_orm_active_enums::UserStatus};
use brokerdesk_shared::{AccessToken, AppError, LoginRequest, ObjectRef, TokenPair};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{Envelope, created, ok};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{JsonBody, PathParam},
};

/// Creates the account routes, relative to `/user`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/login", post(login))
        .route("/token/refresh", get(refresh))
        .route("/verify-email/{token}", get(verify_email))
        .route("/reset-password/{email}", get(send_password_reset_mail))
        .route("/reset-password", post(reset_password))
}

// ============================================================================
// Request Types
// ============================================================================

/// Sign-up payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login e-mail.
    pub email: String,
    /// Plain password.
    pub password: String,
    /// Display name.
    pub name: String,
}

/// Password reset payload.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Token from the reset mail.
    pub token: String,
    /// New password.
    pub new_password: String,
    /// Repetition of the new password.
    pub new_password_check: String,
}

fn new_email_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn withdrawn() -> ApiError {
    ApiError::not_found("The account does not exist or has been withdrawn")
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /user - Register and send the verification mail.
async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_person_name(&payload.name)?;

    let password_hash = hash_password(&payload.password)?;
    let token = new_email_token();
    let user = UserRepository::new((*state.db).clone())
        .register(&payload.email, &password_hash, &payload.name, &token)
        .await?;

    let link = format!("{}/api/user/verify-email/{token}", state.settings.public_url);
    state
        .email_service
        .send_verification_email(&user.email, &user.name, &link)
        .await?;

    info!(user_id = %user.id, "User registered");
    Ok(created(user.id))
}

/// POST /user/login - Exchange credentials for a token pair.
async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Envelope<TokenPair>> {
    validate_email(&payload.email)?;
    let user = UserRepository::new((*state.db).clone())
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(withdrawn)?;

    match user.status {
        UserStatus::Registered => {
            return Err(ApiError::validation(
                "Please verify your e-mail address first. Check your spam folder if the mail has not arrived",
            ));
        }
        UserStatus::Verified => {
            return Err(ApiError::validation("The account is waiting for approval"));
        }
        UserStatus::Deleted => return Err(withdrawn()),
        UserStatus::Accepted => {}
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(ApiError::validation("The password is incorrect"));
    }

    let pair = TokenPair {
        access_token: state.jwt_service.generate_access_token(user.id)?,
        refresh_token: state.jwt_service.generate_refresh_token(user.id)?,
    };
    info!(user_id = %user.id, "User logged in");
    Ok(ok(pair))
}

/// GET /user/token/refresh - Trade the bearer refresh token for an access token.
async fn refresh(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> ApiResult<Envelope<AccessToken>> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ApiError(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        )));
    };
    let access_token = state.jwt_service.refresh_access_token(bearer.token())?;
    Ok(ok(AccessToken { access_token }))
}

fn alert_page(status: StatusCode, message: &str) -> Response {
    (
        status,
        Html(format!(
            "<html><script>alert('{message}');location.href='/';</script></html>"
        )),
    )
        .into_response()
}

/// GET /user/verify-email/{token} - Confirm the address and go to the front page.
async fn verify_email(State(state): State<AppState>, PathParam(token): PathParam<String>) -> Response {
    match UserRepository::new((*state.db).clone())
        .verify_email(&token)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "E-mail verified");
            Redirect::temporary(&state.settings.public_url).into_response()
        }
        Err(UserError::InvalidToken) => {
            alert_page(StatusCode::BAD_REQUEST, "The verification link is invalid")
        }
        Err(e) => {
            warn!(error = %e, "E-mail verification failed");
            alert_page(StatusCode::CONFLICT, "An unexpected error occurred")
        }
    }
}

/// GET /user/reset-password/{email} - Mail a password reset link.
async fn send_password_reset_mail(
    State(state): State<AppState>,
    PathParam(email): PathParam<String>,
) -> ApiResult<Envelope<()>> {
    validate_email(&email)?;
    let repo = UserRepository::new((*state.db).clone());
    let user = repo
        .find_by_email(&email)
        .await?
        .filter(|u| matches!(u.status, UserStatus::Verified | UserStatus::Accepted))
        .ok_or_else(withdrawn)?;

    let token = new_email_token();
    let user = repo.set_email_token(user, &token).await?;
    let link = format!("{}/reset-password?token={token}", state.settings.public_url);
    state
        .email_service
        .send_password_reset_email(&user.email, &user.name, &link)
        .await?;

    info!(user_id = %user.id, "Password reset mail sent");
    Ok(ok(()))
}

/// POST /user/reset-password - Set a new password with a mailed token.
async fn reset_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ResetPasswordRequest>,
) -> ApiResult<Envelope<ObjectRef>> {
    let repo = UserRepository::new((*state.db).clone());
    let user = repo
        .find_by_reset_token(&payload.token)
        .await?
        .ok_or_else(|| ApiError::validation("The reset token is invalid"))?;

    if payload.new_password != payload.new_password_check {
        return Err(ApiError::validation(
            "The password and its confirmation do not match",
        ));
    }
    validate_password(&payload.new_password)?;

    let password_hash = hash_password(&payload.new_password)?;
    let user = repo
        .set_password(user, &password_hash, Some(&new_email_token()))
        .await?;

    info!(user_id = %user.id, "Password reset");
    Ok(ok(ObjectRef::Updated(user.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_tokens_are_hex() {
        let token = new_email_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, new_email_token());
    }

    #[test]
    fn test_alert_page_status() {
        let response = alert_page(StatusCode::BAD_REQUEST, "nope");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
