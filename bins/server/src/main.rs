//! BrokerDesk API Server
//!
//! Main entry point for the BrokerDesk back office service.

use std::sync::Arc;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brokerdesk_api::{ApiSettings, AppState, create_router};
use brokerdesk_db::{BootstrapOutcome, connect, ensure_superuser, migration::Migrator};
use brokerdesk_shared::{AppConfig, EmailService, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brokerdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let settings = ApiSettings::from_config(&config.server)
        .map_err(|zone| anyhow::anyhow!("Unknown time zone '{zone}'"))?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    match &config.superuser {
        Some(superuser) => match ensure_superuser(&db, superuser).await? {
            BootstrapOutcome::Created { user_id } => {
                info!(user_id = %user_id, "Administrator account created");
            }
            BootstrapOutcome::Skipped => {}
        },
        None => warn!("No superuser configured; skipping administrator bootstrap"),
    }

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        email_service: Arc::new(email_service),
        settings: Arc::new(settings),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for the shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
