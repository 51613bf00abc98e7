//! API route definitions.

use axum::{Json, Router, http::StatusCode, middleware};
use brokerdesk_shared::{ApiResponse, ObjectRef};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod account;
pub mod dashboard;
pub mod health;
pub mod insurance_companies;
pub mod invoices;
pub mod roles;
pub mod transactions;
pub mod users;

/// Successful response body.
pub type Envelope<T> = Json<ApiResponse<T>>;

/// Wraps a payload in the success envelope.
pub const fn ok<T>(result: T) -> Envelope<T> {
    Json(ApiResponse {
        success: true,
        message: "OK",
        result,
    })
}

/// 201 with the ID of the inserted row.
pub const fn created(id: i64) -> (StatusCode, Envelope<ObjectRef>) {
    (StatusCode::CREATED, ok(ObjectRef::Created(id)))
}

/// Creates the API router; everything except health and the account flows
/// requires an access token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protect = |router: Router<AppState>| {
        router.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
    };

    let user_routes = account::routes()
        .merge(protect(roles::routes()))
        .merge(protect(users::routes()));
    let transaction_routes =
        protect(insurance_companies::routes()).merge(protect(transactions::routes()));

    Router::new()
        .merge(health::routes())
        .nest("/user", user_routes)
        .nest("/transaction", transaction_routes)
        .nest("/invoice", protect(invoices::routes()))
        .nest("/dashboard", protect(dashboard::routes()))
}
