//! Request extractors: the permission-resolved caller and envelope-aware
//! wrappers around axum's body, query and path extractors.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use brokerdesk_core::permission::PermissionSet;
use brokerdesk_db::PermissionRepository;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// JSON body whose rejection renders as a 400 envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string whose rejection renders as a 400 envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Path parameters whose rejection renders as a 400 envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// An authenticated, accepted member together with their access levels.
///
/// Rejects with 403 when the account is not accepted or has no permission row.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    /// The member's ID.
    pub user_id: i64,
    /// The member's levels.
    pub permissions: PermissionSet,
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let user_id = auth.user_id().ok_or_else(ApiError::forbidden)?;

        let permissions = PermissionRepository::new((*state.db).clone())
            .caller_permissions(user_id)
            .await?
            .ok_or_else(ApiError::forbidden)?;

        Ok(Self {
            user_id,
            permissions,
        })
    }
}
