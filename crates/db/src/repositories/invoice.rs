//! Invoice repository: extras, settled snapshots and the live calculation inputs.

use brokerdesk_core::Period;
use brokerdesk_core::invoice::{
    CompanyInvoiceSummary, CompanyTotals, ExtraLine, InvoiceError, InvoiceService, MemberFees,
    UserInvoiceSummary,
};
use brokerdesk_core::permission::InvoiceAccess;
use brokerdesk_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;

use super::transaction::totals_between;
use super::{period_from_key, period_key};
use crate::entities::{
    company_invoice_extras, company_invoices, permissions,
    sea_orm_active_enums::{InvoiceAccessLevel, UserStatus},
    user_invoice_extras, user_invoices, users,
};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceRepoError {
    /// Member not found.
    #[error("The account does not exist or has been withdrawn")]
    UserNotFound(i64),

    /// Extra line not found.
    #[error("The extra item does not exist")]
    ExtraNotFound(i64),

    /// Extra name already used in the period.
    #[error("Extra item '{0}' already exists for this month")]
    DuplicateExtra(String),

    /// Rule of the invoice engine.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<InvoiceRepoError> for AppError {
    fn from(err: InvoiceRepoError) -> Self {
        match err {
            InvoiceRepoError::UserNotFound(_) | InvoiceRepoError::ExtraNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            InvoiceRepoError::DuplicateExtra(_) => Self::Conflict(err.to_string()),
            InvoiceRepoError::Invoice(e) => e.into(),
            InvoiceRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// An extra line as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraItem {
    /// Extra id.
    pub id: i64,
    /// Label.
    pub name: String,
    /// Signed amount in won.
    pub price: i64,
}

/// Company-wide figures of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyFigures {
    /// Σ cancel_fee of canceled sales.
    pub cancel_fee: i64,
    /// Σ price of live sales plus Σ cancel_fee of canceled ones.
    pub revenue: i64,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Member extras
    // ------------------------------------------------------------------

    /// Lists a member's extras for a month.
    pub async fn list_user_extras(
        &self,
        user_id: i64,
        period: Period,
    ) -> Result<Vec<ExtraItem>, InvoiceRepoError> {
        let (year, month) = period_key(period);
        let rows = user_invoice_extras::Entity::find()
            .filter(user_invoice_extras::Column::UserId.eq(user_id))
            .filter(user_invoice_extras::Column::Year.eq(year))
            .filter(user_invoice_extras::Column::Month.eq(month))
            .order_by_asc(user_invoice_extras::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| ExtraItem {
                id: r.id,
                name: r.name,
                price: r.price,
            })
            .collect())
    }

    async fn ensure_user_extra_name_free(
        &self,
        user_id: i64,
        period: Period,
        name: &str,
    ) -> Result<(), InvoiceRepoError> {
        let (year, month) = period_key(period);
        let taken = user_invoice_extras::Entity::find()
            .filter(user_invoice_extras::Column::UserId.eq(user_id))
            .filter(user_invoice_extras::Column::Year.eq(year))
            .filter(user_invoice_extras::Column::Month.eq(month))
            .filter(user_invoice_extras::Column::Name.eq(name))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(InvoiceRepoError::DuplicateExtra(name.to_string()));
        }
        Ok(())
    }

    async fn ensure_user_open(&self, user_id: i64, period: Period) -> Result<(), InvoiceRepoError> {
        if self.find_user_invoice(user_id, period).await?.is_some() {
            return Err(InvoiceError::AlreadySettled(period).into());
        }
        Ok(())
    }

    /// Adds an extra line to a member's open month.
    pub async fn create_user_extra(
        &self,
        user_id: i64,
        period: Period,
        name: &str,
        price: i64,
    ) -> Result<user_invoice_extras::Model, InvoiceRepoError> {
        if users::Entity::find_by_id(user_id).one(&self.db).await?.is_none() {
            return Err(InvoiceRepoError::UserNotFound(user_id));
        }
        self.ensure_user_open(user_id, period).await?;
        self.ensure_user_extra_name_free(user_id, period, name).await?;

        let (year, month) = period_key(period);
        let now = chrono::Utc::now().into();
        let row = user_invoice_extras::ActiveModel {
            user_id: Set(user_id),
            year: Set(year),
            month: Set(month),
            name: Set(name.to_string()),
            price: Set(price),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(row.insert(&self.db).await?)
    }

    async fn get_user_extra(
        &self,
        id: i64,
    ) -> Result<(user_invoice_extras::Model, Period), InvoiceRepoError> {
        let row = user_invoice_extras::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceRepoError::ExtraNotFound(id))?;
        let period = period_from_key(row.year, row.month).ok_or(InvoiceRepoError::ExtraNotFound(id))?;
        Ok((row, period))
    }

    /// Changes an extra line of a member's open month.
    pub async fn update_user_extra(
        &self,
        id: i64,
        name: Option<String>,
        price: Option<i64>,
    ) -> Result<user_invoice_extras::Model, InvoiceRepoError> {
        let (row, period) = self.get_user_extra(id).await?;
        self.ensure_user_open(row.user_id, period).await?;
        if let Some(name) = &name {
            self.ensure_user_extra_name_free(row.user_id, period, name)
                .await?;
        }

        let mut active: user_invoice_extras::ActiveModel = row.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(price) = price {
            active.price = Set(price);
        }
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes an extra line of a member's open month.
    pub async fn delete_user_extra(&self, id: i64) -> Result<(), InvoiceRepoError> {
        let (row, period) = self.get_user_extra(id).await?;
        self.ensure_user_open(row.user_id, period).await?;
        user_invoice_extras::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Company extras
    // ------------------------------------------------------------------

    /// Lists the company's extras for a month.
    pub async fn list_company_extras(
        &self,
        period: Period,
    ) -> Result<Vec<ExtraItem>, InvoiceRepoError> {
        let (year, month) = period_key(period);
        let rows = company_invoice_extras::Entity::find()
            .filter(company_invoice_extras::Column::Year.eq(year))
            .filter(company_invoice_extras::Column::Month.eq(month))
            .order_by_asc(company_invoice_extras::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| ExtraItem {
                id: r.id,
                name: r.name,
                price: r.price,
            })
            .collect())
    }

    async fn ensure_company_extra_name_free(
        &self,
        period: Period,
        name: &str,
    ) -> Result<(), InvoiceRepoError> {
        let (year, month) = period_key(period);
        let taken = company_invoice_extras::Entity::find()
            .filter(company_invoice_extras::Column::Year.eq(year))
            .filter(company_invoice_extras::Column::Month.eq(month))
            .filter(company_invoice_extras::Column::Name.eq(name))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(InvoiceRepoError::DuplicateExtra(name.to_string()));
        }
        Ok(())
    }

    async fn ensure_company_open(&self, period: Period) -> Result<(), InvoiceRepoError> {
        if self.find_company_invoice(period).await?.is_some() {
            return Err(InvoiceError::AlreadySettled(period).into());
        }
        Ok(())
    }

    /// Adds an extra line to the company's open month.
    pub async fn create_company_extra(
        &self,
        period: Period,
        name: &str,
        price: i64,
    ) -> Result<company_invoice_extras::Model, InvoiceRepoError> {
        self.ensure_company_open(period).await?;
        self.ensure_company_extra_name_free(period, name).await?;

        let (year, month) = period_key(period);
        let now = chrono::Utc::now().into();
        let row = company_invoice_extras::ActiveModel {
            year: Set(year),
            month: Set(month),
            name: Set(name.to_string()),
            price: Set(price),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(row.insert(&self.db).await?)
    }

    async fn get_company_extra(
        &self,
        id: i64,
    ) -> Result<(company_invoice_extras::Model, Period), InvoiceRepoError> {
        let row = company_invoice_extras::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceRepoError::ExtraNotFound(id))?;
        let period = period_from_key(row.year, row.month).ok_or(InvoiceRepoError::ExtraNotFound(id))?;
        Ok((row, period))
    }

    /// Changes an extra line of the company's open month.
    pub async fn update_company_extra(
        &self,
        id: i64,
        name: Option<String>,
        price: Option<i64>,
    ) -> Result<company_invoice_extras::Model, InvoiceRepoError> {
        let (row, period) = self.get_company_extra(id).await?;
        self.ensure_company_open(period).await?;
        if let Some(name) = &name {
            self.ensure_company_extra_name_free(period, name).await?;
        }

        let mut active: company_invoice_extras::ActiveModel = row.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(price) = price {
            active.price = Set(price);
        }
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes an extra line of the company's open month.
    pub async fn delete_company_extra(&self, id: i64) -> Result<(), InvoiceRepoError> {
        let (_, period) = self.get_company_extra(id).await?;
        self.ensure_company_open(period).await?;
        company_invoice_extras::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Member invoices
    // ------------------------------------------------------------------

    /// Finds a member's settled snapshot.
    pub async fn find_user_invoice(
        &self,
        user_id: i64,
        period: Period,
    ) -> Result<Option<user_invoices::Model>, DbErr> {
        let (year, month) = period_key(period);
        user_invoices::Entity::find()
            .filter(user_invoices::Column::UserId.eq(user_id))
            .filter(user_invoices::Column::Year.eq(year))
            .filter(user_invoices::Column::Month.eq(month))
            .one(&self.db)
            .await
    }

    /// Computes a member's payroll from the live ledger.
    pub async fn calculate_user_invoice(
        &self,
        user: &users::Model,
        period: Period,
    ) -> Result<UserInvoiceSummary, InvoiceRepoError> {
        let totals = totals_between(&self.db, Some(user.id), period.first_day(), period.last_day())
            .await?;
        let extra = self
            .list_user_extras(user.id, period)
            .await?
            .into_iter()
            .map(|e| ExtraLine::new(e.name, e.price))
            .collect();
        let fees = MemberFees {
            plate_fee: user.plate_fee,
            contract_fee: user.contract_fee,
        };
        Ok(InvoiceService::calculate_user_invoice(
            user.id, period, fees, totals, extra,
        )?)
    }

    /// The settled snapshot if there is one, otherwise the live calculation.
    pub async fn user_invoice(
        &self,
        user: &users::Model,
        period: Period,
    ) -> Result<UserInvoiceSummary, InvoiceRepoError> {
        match self.find_user_invoice(user.id, period).await? {
            Some(snapshot) => {
                let extra = self
                    .list_user_extras(user.id, period)
                    .await?
                    .into_iter()
                    .map(|e| ExtraLine::new(e.name, e.price))
                    .collect();
                Ok(user_summary_from_snapshot(snapshot, period, extra))
            }
            None => self.calculate_user_invoice(user, period).await,
        }
    }

    /// Settles a member's month by persisting the live calculation.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::AlreadySettled` if a snapshot exists.
    pub async fn settle_user_invoice(
        &self,
        user_id: i64,
        period: Period,
    ) -> Result<user_invoices::Model, InvoiceRepoError> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceRepoError::UserNotFound(user_id))?;
        self.ensure_user_open(user_id, period).await?;

        let summary = self.calculate_user_invoice(&user, period).await?;
        let (year, month) = period_key(period);
        let now = chrono::Utc::now().into();
        let row = user_invoices::ActiveModel {
            user_id: Set(user_id),
            year: Set(year),
            month: Set(month),
            contract_fee: Set(summary.contract_fee),
            plate_fee: Set(summary.plate_fee),
            transaction_count: Set(summary.transaction_count),
            canceled_transaction_count: Set(summary.canceled_transaction_count),
            revenue: Set(summary.revenue),
            cancel_fee: Set(summary.cancel_fee),
            total_revenue: Set(summary.total_revenue),
            total_contract_fee: Set(summary.total_contract_fee),
            first_vat: Set(summary.first_vat),
            first_income: Set(summary.first_income),
            second_vat: Set(summary.second_vat),
            second_income: Set(summary.second_income),
            income: Set(summary.income),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(row.insert(&self.db).await?)
    }

    /// Counts accepted members without a snapshot for the month.
    ///
    /// Members holding invoice `ARW` run payroll themselves and are not counted.
    pub async fn unsettled_member_count(&self, period: Period) -> Result<usize, DbErr> {
        let (year, month) = period_key(period);
        let accepted: Vec<i64> = users::Entity::find()
            .filter(users::Column::Status.eq(UserStatus::Accepted))
            .select_only()
            .column(users::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        let administrators: Vec<i64> = permissions::Entity::find()
            .filter(
                permissions::Column::InvoiceLevel.eq(InvoiceAccessLevel::from(InvoiceAccess::Arw)),
            )
            .select_only()
            .column(permissions::Column::UserId)
            .into_tuple()
            .all(&self.db)
            .await?;
        let settled: Vec<i64> = user_invoices::Entity::find()
            .filter(user_invoices::Column::Year.eq(year))
            .filter(user_invoices::Column::Month.eq(month))
            .select_only()
            .column(user_invoices::Column::UserId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(accepted
            .iter()
            .filter(|id| !administrators.contains(id) && !settled.contains(id))
            .count())
    }

    /// Fails unless every member that needs a snapshot has one.
    pub async fn ensure_members_settled(&self, period: Period) -> Result<(), InvoiceRepoError> {
        match self.unsettled_member_count(period).await? {
            0 => Ok(()),
            missing => Err(InvoiceError::MembersNotSettled(missing).into()),
        }
    }

    // ------------------------------------------------------------------
    // Company invoices
    // ------------------------------------------------------------------

    /// Finds the company's settled snapshot.
    pub async fn find_company_invoice(
        &self,
        period: Period,
    ) -> Result<Option<company_invoices::Model>, DbErr> {
        let (year, month) = period_key(period);
        company_invoices::Entity::find()
            .filter(company_invoices::Column::Year.eq(year))
            .filter(company_invoices::Column::Month.eq(month))
            .one(&self.db)
            .await
    }

    /// Revenue and cancellation fees of every sale in the month.
    pub async fn monthly_figures(&self, period: Period) -> Result<MonthlyFigures, DbErr> {
        let totals = totals_between(&self.db, None, period.first_day(), period.last_day()).await?;
        Ok(MonthlyFigures {
            cancel_fee: totals.cancel_fee,
            revenue: totals.total_revenue(),
        })
    }

    /// Σ plate_fee and Σ income over the month's member snapshots.
    pub async fn settled_payroll(&self, period: Period) -> Result<(i64, i64), DbErr> {
        let (year, month) = period_key(period);
        let rows: Vec<(i64, i64)> = user_invoices::Entity::find()
            .filter(user_invoices::Column::Year.eq(year))
            .filter(user_invoices::Column::Month.eq(month))
            .select_only()
            .column(user_invoices::Column::PlateFee)
            .column(user_invoices::Column::Income)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows
            .iter()
            .fold((0, 0), |(plate, income), (p, i)| (plate + p, income + i)))
    }

    /// Computes the company's month from the ledger and the member snapshots.
    pub async fn calculate_company_invoice(
        &self,
        period: Period,
        rental_fee: Option<i64>,
        maintenance_fee: Option<i64>,
    ) -> Result<CompanyInvoiceSummary, InvoiceRepoError> {
        let figures = self.monthly_figures(period).await?;
        let (plate_fee, employee_salary) = self.settled_payroll(period).await?;
        let extra = self
            .list_company_extras(period)
            .await?
            .into_iter()
            .map(|e| ExtraLine::new(e.name, e.price))
            .collect();
        let totals = CompanyTotals {
            revenue: figures.revenue,
            plate_fee,
            employee_salary,
        };
        Ok(InvoiceService::calculate_company_invoice(
            period,
            totals,
            extra,
            rental_fee,
            maintenance_fee,
        )?)
    }

    /// The settled snapshot if there is one, otherwise the live calculation
    /// without rental, maintenance or income.
    pub async fn company_invoice(
        &self,
        period: Period,
    ) -> Result<CompanyInvoiceSummary, InvoiceRepoError> {
        match self.find_company_invoice(period).await? {
            Some(snapshot) => {
                let extra = self
                    .list_company_extras(period)
                    .await?
                    .into_iter()
                    .map(|e| ExtraLine::new(e.name, e.price))
                    .collect();
                Ok(CompanyInvoiceSummary {
                    year: period.year,
                    month: period.month,
                    revenue: snapshot.revenue,
                    plate_fee: snapshot.plate_fee,
                    employee_salary: snapshot.employee_salary,
                    extra,
                    rental_fee: Some(snapshot.rental_fee),
                    maintenance_fee: Some(snapshot.maintenance_fee),
                    income: Some(snapshot.income),
                })
            }
            None => self.calculate_company_invoice(period, None, None).await,
        }
    }

    /// Settles the company's month.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::AlreadySettled` if a snapshot exists.
    pub async fn settle_company_invoice(
        &self,
        period: Period,
        rental_fee: i64,
        maintenance_fee: i64,
    ) -> Result<company_invoices::Model, InvoiceRepoError> {
        self.ensure_company_open(period).await?;

        let summary = self
            .calculate_company_invoice(period, Some(rental_fee), Some(maintenance_fee))
            .await?;
        let (year, month) = period_key(period);
        let now = chrono::Utc::now().into();
        let row = company_invoices::ActiveModel {
            year: Set(year),
            month: Set(month),
            revenue: Set(summary.revenue),
            plate_fee: Set(summary.plate_fee),
            employee_salary: Set(summary.employee_salary),
            rental_fee: Set(rental_fee),
            maintenance_fee: Set(maintenance_fee),
            income: Set(summary.income.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(row.insert(&self.db).await?)
    }
}

/// Rebuilds the summary shape from a stored snapshot.
#[must_use]
pub fn user_summary_from_snapshot(
    snapshot: user_invoices::Model,
    period: Period,
    extra: Vec<ExtraLine>,
) -> UserInvoiceSummary {
    UserInvoiceSummary {
        user_id: snapshot.user_id,
        year: period.year,
        month: period.month,
        contract_fee: snapshot.contract_fee,
        plate_fee: snapshot.plate_fee,
        transaction_count: snapshot.transaction_count,
        canceled_transaction_count: snapshot.canceled_transaction_count,
        revenue: snapshot.revenue,
        cancel_fee: snapshot.cancel_fee,
        total_revenue: snapshot.total_revenue,
        total_contract_fee: snapshot.total_contract_fee,
        first_vat: snapshot.first_vat,
        first_income: snapshot.first_income,
        extra,
        second_vat: snapshot.second_vat,
        second_income: snapshot.second_income,
        income: snapshot.income,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_keeps_stored_figures() {
        let now = chrono::Utc::now().into();
        let snapshot = user_invoices::Model {
            id: 1,
            user_id: 4,
            year: 2022,
            month: 5,
            contract_fee: dec!(15),
            plate_fee: 100_000,
            transaction_count: 2,
            canceled_transaction_count: 0,
            revenue: 1_000_000,
            cancel_fee: 0,
            total_revenue: 1_000_000,
            total_contract_fee: 150_000,
            first_vat: 85_000,
            first_income: 835_000,
            second_vat: 0,
            second_income: 0,
            income: 835_000,
            created_at: now,
            updated_at: now,
        };
        let period = Period::new(2022, 5).unwrap();
        let summary =
            user_summary_from_snapshot(snapshot, period, vec![ExtraLine::new("bonus", 1)]);

        assert_eq!(summary.user_id, 4);
        assert_eq!(summary.month, 5);
        assert_eq!(summary.income, 835_000);
        assert_eq!(summary.extra.len(), 1);
    }
}
