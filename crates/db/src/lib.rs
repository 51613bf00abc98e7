//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - First-start provisioning of the administrator

pub mod bootstrap;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use bootstrap::{BootstrapError, BootstrapOutcome, ensure_superuser};
pub use repositories::{
    DashboardRepository, InsuranceCompanyRepository, InvoiceRepository, PermissionRepository,
    RoleRepository, TransactionRepository, UserRepository,
};

use std::time::Duration;

use brokerdesk_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(&config.url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    Database::connect(options).await
}
