//! First-start provisioning of the administrator account.

use brokerdesk_core::auth::{PasswordError, hash_password};
use brokerdesk_core::permission::PermissionSet;
use brokerdesk_shared::SuperuserConfig;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{sea_orm_active_enums::UserStatus, user_roles, users};
use crate::repositories::permission::upsert_permission;

/// Errors raised while provisioning the administrator.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Password could not be hashed.
    #[error("Failed to hash superuser password: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// What [`ensure_superuser`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Role, user and permission row were created.
    Created {
        /// ID of the new user.
        user_id: i64,
    },
    /// The role or the e-mail already existed.
    Skipped,
}

/// Creates the administrator role, an accepted user and an all-access
/// permission row, unless the role or the e-mail already exists.
///
/// # Errors
///
/// Returns an error if hashing or any database write fails; nothing is
/// persisted in that case.
pub async fn ensure_superuser(
    db: &DatabaseConnection,
    settings: &SuperuserConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    let role_exists = user_roles::Entity::find()
        .filter(user_roles::Column::Name.eq(&settings.role))
        .one(db)
        .await?
        .is_some();
    let email_exists = users::Entity::find()
        .filter(users::Column::Email.eq(&settings.email))
        .one(db)
        .await?
        .is_some();
    if role_exists || email_exists {
        info!(email = %settings.email, "Superuser already provisioned, skipping");
        return Ok(BootstrapOutcome::Skipped);
    }

    let password_hash = hash_password(&settings.password)?;
    let now = chrono::Utc::now().into();

    let txn = db.begin().await?;
    let role = user_roles::ActiveModel {
        name: Set(settings.role.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let user = users::ActiveModel {
        email: Set(settings.email.clone()),
        email_token: Set(String::new()),
        password_hash: Set(password_hash),
        name: Set(settings.name.clone()),
        role_id: Set(Some(role.id)),
        status: Set(UserStatus::Accepted),
        plate_fee: Set(0),
        contract_fee: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    upsert_permission(&txn, user.id, PermissionSet::ADMIN).await?;
    txn.commit().await?;

    info!(user_id = %user.id, role = %role.name, "Superuser created");
    Ok(BootstrapOutcome::Created { user_id: user.id })
}
