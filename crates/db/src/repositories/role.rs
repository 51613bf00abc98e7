//! Role repository for the free-text member role labels.

use brokerdesk_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{user_roles, users};

/// Error types for role operations.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    /// Role not found.
    #[error("The role does not exist")]
    NotFound(i64),

    /// Role name already used.
    #[error("Role '{0}' already exists")]
    DuplicateName(String),

    /// Role still assigned to users.
    #[error("The role is still assigned to {0} user(s)")]
    InUse(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RoleError> for AppError {
    fn from(err: RoleError) -> Self {
        match err {
            RoleError::NotFound(_) => Self::NotFound(err.to_string()),
            RoleError::DuplicateName(_) => Self::Conflict(err.to_string()),
            RoleError::InUse(_) => Self::BusinessRule(err.to_string()),
            RoleError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Role repository.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    db: DatabaseConnection,
}

impl RoleRepository {
    /// Creates a new role repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all roles ordered by ID.
    pub async fn list(&self) -> Result<Vec<user_roles::Model>, RoleError> {
        Ok(user_roles::Entity::find()
            .order_by_asc(user_roles::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Finds a role by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<user_roles::Model>, RoleError> {
        Ok(user_roles::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Gets a role by ID, failing when it is missing.
    pub async fn get(&self, id: i64) -> Result<user_roles::Model, RoleError> {
        self.find_by_id(id).await?.ok_or(RoleError::NotFound(id))
    }

    /// Finds a role by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<user_roles::Model>, RoleError> {
        Ok(user_roles::Entity::find()
            .filter(user_roles::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    /// Creates a role.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::DuplicateName` if the name is taken.
    pub async fn create(&self, name: &str) -> Result<user_roles::Model, RoleError> {
        if self.find_by_name(name).await?.is_some() {
            return Err(RoleError::DuplicateName(name.to_string()));
        }

        let now = chrono::Utc::now().into();
        let role = user_roles::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(role.insert(&self.db).await?)
    }

    /// Renames a role.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::NotFound` for an unknown ID and
    /// `RoleError::DuplicateName` if another role already has the name.
    pub async fn rename(&self, id: i64, name: &str) -> Result<user_roles::Model, RoleError> {
        let role = self.get(id).await?;
        if self.find_by_name(name).await?.is_some() {
            return Err(RoleError::DuplicateName(name.to_string()));
        }

        let mut active: user_roles::ActiveModel = role.into();
        active.name = Set(name.to_string());
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a role that no user holds.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::InUse` while any user references the role.
    pub async fn delete(&self, id: i64) -> Result<(), RoleError> {
        self.get(id).await?;

        let holders = users::Entity::find()
            .filter(users::Column::RoleId.eq(id))
            .count(&self.db)
            .await?;
        if holders > 0 {
            return Err(RoleError::InUse(holders));
        }

        user_roles::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
