//! Role management routes.

use axum::{
    Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use brokerdesk_core::permission::AccessLevel;
use brokerdesk_core::validation::validate_role_name;
use brokerdesk_db::RoleRepository;
use brokerdesk_shared::ObjectRef;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Envelope, created, ok};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{Caller, JsonBody, PathParam},
};

/// Creates the role routes, relative to `/user`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/role", get(list_roles).post(create_role))
        .route(
            "/role/{role_id}",
            get(get_role).put(update_role).delete(delete_role),
        )
}

/// Role name payload for create and update.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    /// Role name.
    pub name: String,
}

/// A role as listed to clients.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    /// Role ID.
    pub id: i64,
    /// Role name.
    pub name: String,
}

fn require_user_admin(caller: &Caller) -> ApiResult<()> {
    if caller.permissions.user.writes_all() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

/// POST /user/role
async fn create_role(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<RoleRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_role_name(&payload.name)?;
    require_user_admin(&caller)?;

    let role = RoleRepository::new((*state.db).clone())
        .create(&payload.name)
        .await?;
    info!(role_id = %role.id, created_by = %caller.user_id, "Role created");
    Ok(created(role.id))
}

/// GET /user/role
async fn list_roles(
    State(state): State<AppState>,
    _caller: Caller,
) -> ApiResult<Envelope<Vec<RoleResponse>>> {
    let roles = RoleRepository::new((*state.db).clone()).list().await?;
    Ok(ok(roles
        .into_iter()
        .map(|r| RoleResponse {
            id: r.id,
            name: r.name,
        })
        .collect()))
}

/// GET /user/role/{role_id}
async fn get_role(
    State(state): State<AppState>,
    _caller: Caller,
    PathParam(role_id): PathParam<i64>,
) -> ApiResult<Envelope<RoleResponse>> {
    let role = RoleRepository::new((*state.db).clone())
        .get(role_id)
        .await?;
    Ok(ok(RoleResponse {
        id: role.id,
        name: role.name,
    }))
}

/// PUT /user/role/{role_id}
async fn update_role(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(role_id): PathParam<i64>,
    JsonBody(payload): JsonBody<RoleRequest>,
) -> ApiResult<Envelope<ObjectRef>> {
    validate_role_name(&payload.name)?;
    require_user_admin(&caller)?;

    let role = RoleRepository::new((*state.db).clone())
        .rename(role_id, &payload.name)
        .await?;
    info!(role_id = %role.id, "Role renamed");
    Ok(ok(ObjectRef::Updated(role.id)))
}

/// DELETE /user/role/{role_id}
async fn delete_role(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(role_id): PathParam<i64>,
) -> ApiResult<Envelope<ObjectRef>> {
    require_user_admin(&caller)?;

    RoleRepository::new((*state.db).clone())
        .delete(role_id)
        .await?;
    info!(role_id = %role_id, "Role deleted");
    Ok(ok(ObjectRef::Deleted(role_id)))
}
