//! Router tests that need no database.
//!
//! Most tests run on a disconnected `SeaORM` handle and only check what is
//! decided before a repository is reached. Storage failures are replayed
//! through a mock connection.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use brokerdesk_api::{ApiSettings, AppState, create_router};
use brokerdesk_shared::{EmailConfig, EmailService, JwtConfig, JwtService};
use fake::{Fake, faker::internet::en::SafeEmail, faker::name::en::Name};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use serde_json::{Value, json};
use tower::ServiceExt;

fn jwt() -> JwtService {
    JwtService::new(JwtConfig {
        secret: "router-test-secret".to_string(),
        ..JwtConfig::default()
    })
}

fn app() -> Router {
    app_with(DatabaseConnection::default())
}

fn app_with(db: DatabaseConnection) -> Router {
    create_router(AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt()),
        email_service: Arc::new(EmailService::new(EmailConfig::default())),
        settings: Arc::new(ApiSettings::default()),
    })
}

/// A connection whose every query fails.
fn failing_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_string())])
        .into_connection()
}

fn failing_db_app() -> Router {
    app_with(failing_db())
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    send_to(app(), request).await
}

async fn send_to(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let (status, body) = send(get("/api/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    for uri in [
        "/api/user",
        "/api/user/role",
        "/api/user/3",
        "/api/transaction/insurancecompany",
        "/api/transaction/5",
        "/api/invoice/user?year=2022&month=3",
        "/api/dashboard/current-month-revenue",
    ] {
        let (status, body) = send(get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let refresh = jwt().generate_refresh_token(1).unwrap();
    let (status, _) = send(get_with_token("/api/dashboard/current-day-revenue", &refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_refresh() {
    let refresh = jwt().generate_refresh_token(42).unwrap();
    let (status, body) = send(get_with_token("/api/user/token/refresh", &refresh)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let access = body["result"]["access_token"].as_str().unwrap();
    let claims = jwt().validate_access_token(access).unwrap();
    assert_eq!(claims.user_id(), Some(42));
}

#[tokio::test]
async fn test_token_refresh_rejects_access_tokens_and_missing_header() {
    let access = jwt().generate_access_token(42).unwrap();
    let (status, _) = send(get_with_token("/api/user/token/refresh", &access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(get("/api/user/token/refresh")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validates_before_touching_the_database() {
    let email: String = SafeEmail().fake();
    let name: String = Name().fake();
    let (status, body) = send(post_json(
        "/api/user",
        &json!({"email": email, "password": "short", "name": name}),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = send(post_json("/api/user", &json!({ "email": email }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_storage_failures_are_masked() {
    let access = jwt().generate_access_token(1).unwrap();
    let (status, body) = send_to(failing_db_app(), get_with_token("/api/user", &access)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "DATABASE_ERROR");
    assert_eq!(body["message"], "An unexpected error occurred");
}

#[tokio::test]
async fn test_login_when_storage_fails() {
    let (status, body) = send_to(
        failing_db_app(),
        post_json(
            "/api/user/login",
            &json!({"email": "kim@example.com", "password": "passw0rd!"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "An unexpected error occurred");
}

#[tokio::test]
async fn test_malformed_emails_are_rejected() {
    let (status, body) = send(post_json(
        "/api/user",
        &json!({"email": "not-an-email", "password": "passw0rd!", "name": "kim"}),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = send(post_json(
        "/api/user/login",
        &json!({"email": "kim@", "password": "passw0rd!"}),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, _) = send(get("/api/user/reset-password/nobody")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = send(get("/api/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
