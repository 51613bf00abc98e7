//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Authentication middleware
//! - Request extractors
//! - The error envelope

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::Router;
use axum::http::HeaderValue;
use brokerdesk_shared::{EmailService, JwtService, ServerConfig};
use chrono::NaiveDate;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Server settings handlers need at request time.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL used in mail links and redirects, without a trailing slash.
    pub public_url: String,
    /// Zone in which "today" is evaluated.
    pub timezone: Tz,
    /// Origins allowed by CORS; empty allows any.
    pub allowed_origins: Vec<String>,
}

impl ApiSettings {
    /// Builds the settings from the server section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns the offending name when the time zone is unknown.
    pub fn from_config(server: &ServerConfig) -> Result<Self, String> {
        Ok(Self {
            public_url: server.public_url.trim_end_matches('/').to_string(),
            timezone: server.tz()?,
            allowed_origins: server.allowed_origins.clone(),
        })
    }

    /// Today's date in the configured zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8080".to_string(),
            timezone: chrono_tz::Asia::Seoul,
            allowed_origins: Vec::new(),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Email service for sending emails.
    pub email_service: Arc<EmailService>,
    /// Request-time server settings.
    pub settings: Arc<ApiSettings>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.allowed_origins);
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
