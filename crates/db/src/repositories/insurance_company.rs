//! Insurance company repository.

use brokerdesk_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{insurance_companies, transactions};

/// Error types for insurance company operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// Company not found.
    #[error("The insurance company does not exist")]
    NotFound(i64),

    /// Name already used.
    #[error("Insurance company '{0}' already exists")]
    DuplicateName(String),

    /// Transactions still reference the company.
    #[error("The insurance company is used by {0} transaction(s)")]
    InUse(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CompanyError> for AppError {
    fn from(err: CompanyError) -> Self {
        match err {
            CompanyError::NotFound(_) => Self::NotFound(err.to_string()),
            CompanyError::DuplicateName(_) => Self::Conflict(err.to_string()),
            CompanyError::InUse(_) => Self::BusinessRule(err.to_string()),
            CompanyError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Insurance company repository.
#[derive(Debug, Clone)]
pub struct InsuranceCompanyRepository {
    db: DatabaseConnection,
}

impl InsuranceCompanyRepository {
    /// Creates a new insurance company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all companies ordered by ID.
    pub async fn list(&self) -> Result<Vec<insurance_companies::Model>, CompanyError> {
        Ok(insurance_companies::Entity::find()
            .order_by_asc(insurance_companies::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Gets a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::NotFound` if it does not exist.
    pub async fn get(&self, id: i64) -> Result<insurance_companies::Model, CompanyError> {
        insurance_companies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CompanyError::NotFound(id))
    }

    async fn ensure_name_free(&self, name: &str) -> Result<(), CompanyError> {
        let taken = insurance_companies::Entity::find()
            .filter(insurance_companies::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        match taken {
            Some(_) => Err(CompanyError::DuplicateName(name.to_string())),
            None => Ok(()),
        }
    }

    /// Creates a company.
    pub async fn create(&self, name: &str) -> Result<insurance_companies::Model, CompanyError> {
        self.ensure_name_free(name).await?;

        let now = chrono::Utc::now().into();
        let company = insurance_companies::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(company.insert(&self.db).await?)
    }

    /// Renames a company.
    pub async fn rename(
        &self,
        id: i64,
        name: &str,
    ) -> Result<insurance_companies::Model, CompanyError> {
        let company = self.get(id).await?;
        self.ensure_name_free(name).await?;

        let mut active: insurance_companies::ActiveModel = company.into();
        active.name = Set(name.to_string());
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a company no transaction references.
    pub async fn delete(&self, id: i64) -> Result<(), CompanyError> {
        self.get(id).await?;

        let used_by = transactions::Entity::find()
            .filter(transactions::Column::InsuranceCompanyId.eq(id))
            .count(&self.db)
            .await?;
        if used_by > 0 {
            return Err(CompanyError::InUse(used_by));
        }

        insurance_companies::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
