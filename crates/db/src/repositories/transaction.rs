//! Transaction repository for the sales ledger.

use std::collections::HashMap;

use brokerdesk_core::invoice::MonthlyTotals;
use brokerdesk_shared::{AppError, PageRequest};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::{insurance_companies, transactions, users};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("The transaction does not exist")]
    NotFound(i64),

    /// Referenced insurance company not found.
    #[error("The insurance company does not exist")]
    CompanyNotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotFound(_) | TransactionError::CompanyNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            TransactionError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for recording a sale.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Seller.
    pub user_id: i64,
    /// Insurer the policy was sold for.
    pub insurance_company_id: i64,
    /// Plate number.
    pub vehicle_id: String,
    /// Vehicle model.
    pub vehicle_model: String,
    /// Sale date.
    pub date: NaiveDate,
    /// Premium in won.
    pub price: i64,
    /// Free-form note, possibly empty.
    pub memo: String,
}

/// Changes to a recorded sale. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    /// New seller.
    pub user_id: Option<i64>,
    /// New insurer.
    pub insurance_company_id: Option<i64>,
    /// New plate number.
    pub vehicle_id: Option<String>,
    /// New vehicle model.
    pub vehicle_model: Option<String>,
    /// New sale date.
    pub date: Option<NaiveDate>,
    /// New premium.
    pub price: Option<i64>,
    /// New note.
    pub memo: Option<String>,
    /// Cancellation flag.
    pub canceled: Option<bool>,
    /// Fee kept on cancellation.
    pub cancel_fee: Option<i64>,
}

impl TransactionUpdate {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.insurance_company_id.is_none()
            && self.vehicle_id.is_none()
            && self.vehicle_model.is_none()
            && self.date.is_none()
            && self.price.is_none()
            && self.memo.is_none()
            && self.canceled.is_none()
            && self.cancel_fee.is_none()
    }
}

/// Which rows the table shows with respect to cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanceledFilter {
    /// Every row.
    #[default]
    All,
    /// Rows that are still active.
    ExcludeCanceled,
    /// Canceled rows only.
    CanceledOnly,
}

/// Sort column of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionOrder {
    /// Recording order.
    #[default]
    TransactionId,
    /// Seller.
    UserId,
    /// Premium.
    Price,
    /// Cancellation fee.
    CancelFee,
}

/// Sort direction of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Largest first.
    #[default]
    Desc,
    /// Smallest first.
    Asc,
}

impl From<OrderDirection> for Order {
    fn from(direction: OrderDirection) -> Self {
        match direction {
            OrderDirection::Desc => Self::Desc,
            OrderDirection::Asc => Self::Asc,
        }
    }
}

/// Filter and paging for the transaction table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    /// First sale date included.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last sale date included.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Only this seller's sales.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Only this insurer's sales.
    #[serde(default)]
    pub insurance_company_id: Option<i64>,
    /// Page index and size.
    #[serde(flatten)]
    pub page: PageRequest,
    /// Which cancellation states to include.
    #[serde(default)]
    pub canceled_type: CanceledFilter,
    /// Sort column.
    #[serde(default)]
    pub order_by: TransactionOrder,
    /// Sort direction.
    #[serde(default)]
    pub order_type: OrderDirection,
}

/// A row of the transaction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    /// Transaction id.
    pub id: i64,
    /// Sale date.
    pub date: NaiveDate,
    /// When the row was recorded.
    pub created_at: DateTime<Utc>,
    /// Insurer name.
    pub insurance_company_name: String,
    /// Plate number.
    pub vehicle_id: String,
    /// Vehicle model.
    pub vehicle_model: String,
    /// Seller name.
    pub user_name: String,
    /// Premium in won.
    pub price: i64,
    /// Note.
    pub memo: String,
    /// True once canceled.
    pub canceled: bool,
    /// Fee kept on cancellation.
    pub cancel_fee: i64,
}

/// One page of the transaction table.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    /// Rows matching the filter across all pages.
    pub total_length: u64,
    /// Rows of the requested page.
    pub transaction_list: Vec<TransactionRow>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_company(&self, id: i64) -> Result<(), TransactionError> {
        insurance_companies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(TransactionError::CompanyNotFound(id))
    }

    /// Records a sale.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::CompanyNotFound` for an unknown insurance company.
    pub async fn create(&self, input: NewTransaction) -> Result<transactions::Model, TransactionError> {
        self.ensure_company(input.insurance_company_id).await?;

        let now = Utc::now().into();
        let row = transactions::ActiveModel {
            user_id: Set(input.user_id),
            insurance_company_id: Set(input.insurance_company_id),
            vehicle_id: Set(input.vehicle_id),
            vehicle_model: Set(input.vehicle_model),
            date: Set(input.date),
            price: Set(input.price),
            memo: Set(input.memo),
            canceled: Set(false),
            cancel_fee: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(row.insert(&self.db).await?)
    }

    /// Gets a sale by ID.
    pub async fn get(&self, id: i64) -> Result<transactions::Model, TransactionError> {
        transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    /// Applies changes to a sale.
    ///
    /// Un-canceling a sale resets its cancellation fee.
    pub async fn update(
        &self,
        row: transactions::Model,
        update: TransactionUpdate,
    ) -> Result<transactions::Model, TransactionError> {
        if let Some(company_id) = update.insurance_company_id {
            self.ensure_company(company_id).await?;
        }

        let mut active: transactions::ActiveModel = row.into();
        if let Some(user_id) = update.user_id {
            active.user_id = Set(user_id);
        }
        if let Some(company_id) = update.insurance_company_id {
            active.insurance_company_id = Set(company_id);
        }
        if let Some(vehicle_id) = update.vehicle_id {
            active.vehicle_id = Set(vehicle_id);
        }
        if let Some(vehicle_model) = update.vehicle_model {
            active.vehicle_model = Set(vehicle_model);
        }
        if let Some(date) = update.date {
            active.date = Set(date);
        }
        if let Some(price) = update.price {
            active.price = Set(price);
        }
        if let Some(memo) = update.memo {
            active.memo = Set(memo);
        }
        match update.canceled {
            Some(true) => {
                active.canceled = Set(true);
                if let Some(fee) = update.cancel_fee {
                    active.cancel_fee = Set(fee);
                }
            }
            Some(false) => {
                active.canceled = Set(false);
                active.cancel_fee = Set(0);
            }
            None => {
                if let Some(fee) = update.cancel_fee {
                    active.cancel_fee = Set(fee);
                }
            }
        }
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a sale.
    pub async fn delete(&self, id: i64) -> Result<(), TransactionError> {
        let result = transactions::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(TransactionError::NotFound(id));
        }
        Ok(())
    }

    /// Returns one page of the transaction table with user and company names.
    pub async fn table(&self, filter: &TransactionFilter) -> Result<TransactionPage, TransactionError> {
        let mut condition = Condition::all();
        if let Some(start) = filter.start_date {
            condition = condition.add(transactions::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            condition = condition.add(transactions::Column::Date.lte(end));
        }
        if let Some(user_id) = filter.user_id {
            condition = condition.add(transactions::Column::UserId.eq(user_id));
        }
        if let Some(company_id) = filter.insurance_company_id {
            condition = condition.add(transactions::Column::InsuranceCompanyId.eq(company_id));
        }
        match filter.canceled_type {
            CanceledFilter::All => {}
            CanceledFilter::ExcludeCanceled => {
                condition = condition.add(transactions::Column::Canceled.eq(false));
            }
            CanceledFilter::CanceledOnly => {
                condition = condition.add(transactions::Column::Canceled.eq(true));
            }
        }

        let total_length = transactions::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let column = match filter.order_by {
            TransactionOrder::TransactionId => transactions::Column::Id,
            TransactionOrder::UserId => transactions::Column::UserId,
            TransactionOrder::Price => transactions::Column::Price,
            TransactionOrder::CancelFee => transactions::Column::CancelFee,
        };
        let rows = transactions::Entity::find()
            .filter(condition)
            .order_by(column, filter.order_type.into())
            .order_by(transactions::Column::Id, filter.order_type.into())
            .offset(filter.page.offset())
            .limit(filter.page.limit())
            .all(&self.db)
            .await?;

        let user_names: HashMap<i64, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(rows.iter().map(|r| r.user_id)))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();
        let company_names: HashMap<i64, String> = insurance_companies::Entity::find()
            .filter(insurance_companies::Column::Id.is_in(rows.iter().map(|r| r.insurance_company_id)))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let transaction_list = rows
            .into_iter()
            .map(|row| TransactionRow {
                id: row.id,
                date: row.date,
                created_at: row.created_at.with_timezone(&Utc),
                insurance_company_name: company_names
                    .get(&row.insurance_company_id)
                    .cloned()
                    .unwrap_or_default(),
                vehicle_id: row.vehicle_id,
                vehicle_model: row.vehicle_model,
                user_name: user_names.get(&row.user_id).cloned().unwrap_or_default(),
                price: row.price,
                memo: row.memo,
                canceled: row.canceled,
                cancel_fee: row.cancel_fee,
            })
            .collect();

        Ok(TransactionPage {
            total_length,
            transaction_list,
        })
    }

    /// Folds the sales dated `start..=end` into totals, optionally for one member.
    pub async fn totals_between(
        &self,
        user_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlyTotals, DbErr> {
        totals_between(&self.db, user_id, start, end).await
    }
}

/// Folds the sales dated `start..=end` into totals on any connection.
pub(crate) async fn totals_between(
    db: &DatabaseConnection,
    user_id: Option<i64>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<MonthlyTotals, DbErr> {
    let mut query = transactions::Entity::find()
        .filter(transactions::Column::Date.between(start, end));
    if let Some(user_id) = user_id {
        query = query.filter(transactions::Column::UserId.eq(user_id));
    }

    let rows: Vec<(i64, i64, bool)> = query
        .select_only()
        .column(transactions::Column::Price)
        .column(transactions::Column::CancelFee)
        .column(transactions::Column::Canceled)
        .into_tuple()
        .all(db)
        .await?;

    Ok(MonthlyTotals::from_rows(rows))
}
