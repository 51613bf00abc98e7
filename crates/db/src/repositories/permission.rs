//! Permission rows: one set of access levels per member.

use brokerdesk_core::permission::PermissionSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};

use crate::entities::{permissions, sea_orm_active_enums::UserStatus, users};

/// Permission repository.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    db: DatabaseConnection,
}

impl PermissionRepository {
    /// Creates a new permission repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the permission row of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<permissions::Model>, DbErr> {
        permissions::Entity::find()
            .filter(permissions::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Resolves the levels of a caller.
    ///
    /// Only accepted members with a permission row get a set; everyone else
    /// gets `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn caller_permissions(&self, user_id: i64) -> Result<Option<PermissionSet>, DbErr> {
        let row = permissions::Entity::find()
            .filter(permissions::Column::UserId.eq(user_id))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?;

        Ok(row.and_then(|(permission, user)| {
            user.filter(|u| u.status == UserStatus::Accepted)
                .map(|_| PermissionSet::from(&permission))
        }))
    }

    /// Creates or replaces the permission row of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(
        &self,
        user_id: i64,
        set: PermissionSet,
    ) -> Result<permissions::Model, DbErr> {
        upsert_permission(&self.db, user_id, set).await
    }
}

/// Creates or replaces the permission row of a user on any connection.
pub(crate) async fn upsert_permission<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    set: PermissionSet,
) -> Result<permissions::Model, DbErr> {
    let now = chrono::Utc::now().into();
    let existing = permissions::Entity::find()
        .filter(permissions::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    match existing {
        Some(row) => {
            let mut active: permissions::ActiveModel = row.into();
            active.user_level = Set(set.user.into());
            active.transaction_level = Set(set.transaction.into());
            active.invoice_level = Set(set.invoice.into());
            active.updated_at = Set(now);
            active.update(conn).await
        }
        None => {
            permissions::ActiveModel {
                user_id: Set(user_id),
                user_level: Set(set.user.into()),
                transaction_level: Set(set.transaction.into()),
                invoice_level: Set(set.invoice.into()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
        }
    }
}
