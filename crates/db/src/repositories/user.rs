//! User repository for accounts, sign-up and member administration.

use std::collections::HashMap;

use brokerdesk_core::permission::PermissionSet;
use brokerdesk_shared::AppError;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::permission::upsert_permission;
use crate::entities::{permissions, sea_orm_active_enums::UserStatus, user_roles, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// No such account, or it is not in a state the operation accepts.
    #[error("The account does not exist or has been withdrawn")]
    NotFound(i64),

    /// E-mail already belongs to a verified account.
    #[error("This email is already registered")]
    EmailTaken,

    /// No account waits on the token.
    #[error("The link is invalid or has already been used")]
    InvalidToken,

    /// Role referenced by an update does not exist.
    #[error("The role does not exist")]
    RoleNotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::RoleNotFound(_) => Self::NotFound(err.to_string()),
            UserError::EmailTaken => Self::Conflict(err.to_string()),
            UserError::InvalidToken => Self::Validation(err.to_string()),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A user with the role name and permission row used by the member listing.
#[derive(Debug, Clone)]
pub struct MemberView {
    /// The user row.
    pub user: users::Model,
    /// Name of the assigned role.
    pub role_name: Option<String>,
    /// Permission row, if one was ever granted.
    pub permission: Option<permissions::Model>,
}

/// Administrative changes to another member.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New role.
    pub role_id: Option<i64>,
    /// Approve a verified account.
    pub accept: bool,
    /// New monthly plate fee.
    pub plate_fee: Option<i64>,
    /// New contract fee percentage.
    pub contract_fee: Option<Decimal>,
    /// Full permission set to store.
    pub permission: Option<PermissionSet>,
}

/// How a member was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Row deleted outright (never approved).
    Deleted,
    /// Row kept with status `deleted`.
    Withdrawn,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds a user by ID whose status is one of `statuses`.
    pub async fn find_with_status(
        &self,
        id: i64,
        statuses: &[UserStatus],
    ) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find_by_id(id)
            .filter(users::Column::Status.is_in(statuses.iter().copied()))
            .one(&self.db)
            .await?)
    }

    /// Registers a new account, or replaces an unverified sign-up for the same e-mail.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmailTaken` if the e-mail belongs to a verified account.
    pub async fn register(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        email_token: &str,
    ) -> Result<users::Model, UserError> {
        let now = chrono::Utc::now().into();

        match self.find_by_email(email).await? {
            Some(existing) if existing.status != UserStatus::Registered => {
                Err(UserError::EmailTaken)
            }
            Some(existing) => {
                let mut active: users::ActiveModel = existing.into();
                active.password_hash = Set(password_hash.to_string());
                active.name = Set(name.to_string());
                active.email_token = Set(email_token.to_string());
                active.updated_at = Set(now);
                Ok(active.update(&self.db).await?)
            }
            None => {
                let user = users::ActiveModel {
                    email: Set(email.to_string()),
                    email_token: Set(email_token.to_string()),
                    password_hash: Set(password_hash.to_string()),
                    name: Set(name.to_string()),
                    role_id: Set(None),
                    status: Set(UserStatus::Registered),
                    plate_fee: Set(0),
                    contract_fee: Set(Decimal::ZERO),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                Ok(user.insert(&self.db).await?)
            }
        }
    }

    /// Marks the registered account holding `token` as verified.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidToken` if no registered account holds the token.
    pub async fn verify_email(&self, token: &str) -> Result<users::Model, UserError> {
        let user = users::Entity::find()
            .filter(users::Column::EmailToken.eq(token))
            .filter(users::Column::Status.eq(UserStatus::Registered))
            .one(&self.db)
            .await?
            .ok_or(UserError::InvalidToken)?;

        let mut active: users::ActiveModel = user.into();
        active.status = Set(UserStatus::Verified);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Stores a fresh e-mail token on an account.
    pub async fn set_email_token(
        &self,
        user: users::Model,
        token: &str,
    ) -> Result<users::Model, UserError> {
        let mut active: users::ActiveModel = user.into();
        active.email_token = Set(token.to_string());
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Finds a verified or accepted account by its e-mail token.
    pub async fn find_by_reset_token(&self, token: &str) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::EmailToken.eq(token))
            .filter(users::Column::Status.is_in([UserStatus::Verified, UserStatus::Accepted]))
            .one(&self.db)
            .await?)
    }

    /// Replaces the password hash, and the e-mail token when `rotate_token` is given.
    pub async fn set_password(
        &self,
        user: users::Model,
        password_hash: &str,
        rotate_token: Option<&str>,
    ) -> Result<users::Model, UserError> {
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash.to_string());
        if let Some(token) = rotate_token {
            active.email_token = Set(token.to_string());
        }
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Lists every account past e-mail verification with its role and permissions.
    pub async fn list_members(&self) -> Result<Vec<MemberView>, UserError> {
        let rows = users::Entity::find()
            .filter(users::Column::Status.is_in([
                UserStatus::Verified,
                UserStatus::Accepted,
                UserStatus::Deleted,
            ]))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        self.attach_details(rows).await
    }

    /// Finds one account past e-mail verification with its role and permissions.
    pub async fn find_member(&self, id: i64) -> Result<Option<MemberView>, UserError> {
        let Some(user) = self
            .find_with_status(
                id,
                &[UserStatus::Verified, UserStatus::Accepted, UserStatus::Deleted],
            )
            .await?
        else {
            return Ok(None);
        };
        Ok(self.attach_details(vec![user]).await?.pop())
    }

    async fn attach_details(&self, rows: Vec<users::Model>) -> Result<Vec<MemberView>, UserError> {
        let role_ids: Vec<i64> = rows.iter().filter_map(|u| u.role_id).collect();
        let user_ids: Vec<i64> = rows.iter().map(|u| u.id).collect();

        let roles: HashMap<i64, String> = user_roles::Entity::find()
            .filter(user_roles::Column::Id.is_in(role_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();
        let mut grants: HashMap<i64, permissions::Model> = permissions::Entity::find()
            .filter(permissions::Column::UserId.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        Ok(rows
            .into_iter()
            .map(|user| MemberView {
                role_name: user.role_id.and_then(|id| roles.get(&id).cloned()),
                permission: grants.remove(&user.id),
                user,
            })
            .collect())
    }

    /// Applies administrative changes to a member in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `UserError::RoleNotFound` if the new role does not exist.
    pub async fn update_member(
        &self,
        user: users::Model,
        update: MemberUpdate,
    ) -> Result<users::Model, UserError> {
        if let Some(role_id) = update.role_id
            && user_roles::Entity::find_by_id(role_id)
                .one(&self.db)
                .await?
                .is_none()
        {
            return Err(UserError::RoleNotFound(role_id));
        }

        let txn = self.db.begin().await?;
        let user_id = user.id;
        let accept = update.accept && user.status == UserStatus::Verified;

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(role_id) = update.role_id {
            active.role_id = Set(Some(role_id));
        }
        if accept {
            active.status = Set(UserStatus::Accepted);
        }
        if let Some(plate_fee) = update.plate_fee {
            active.plate_fee = Set(plate_fee);
        }
        if let Some(contract_fee) = update.contract_fee {
            active.contract_fee = Set(contract_fee);
        }
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await?;

        if let Some(set) = update.permission {
            upsert_permission(&txn, user_id, set).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Removes a member.
    ///
    /// Accounts that were never approved are deleted with their permission
    /// row; approved accounts keep their history and become `deleted`.
    pub async fn remove(&self, user: users::Model) -> Result<Removal, UserError> {
        match user.status {
            UserStatus::Registered | UserStatus::Verified => {
                let txn = self.db.begin().await?;
                permissions::Entity::delete_many()
                    .filter(permissions::Column::UserId.eq(user.id))
                    .exec(&txn)
                    .await?;
                users::Entity::delete_by_id(user.id).exec(&txn).await?;
                txn.commit().await?;
                Ok(Removal::Deleted)
            }
            UserStatus::Accepted | UserStatus::Deleted => {
                let mut active: users::ActiveModel = user.into();
                active.status = Set(UserStatus::Deleted);
                active.updated_at = Set(chrono::Utc::now().into());
                active.update(&self.db).await?;
                Ok(Removal::Withdrawn)
            }
        }
    }
}
