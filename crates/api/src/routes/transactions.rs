//! Sales ledger routes.

use axum::{
    Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use brokerdesk_core::permission::{AccessLevel, TransactionAccess, can_read_row, can_write_row};
use brokerdesk_core::validation::{
    parse_date, validate_memo, validate_vehicle_id, validate_vehicle_model,
};
use brokerdesk_db::entities::{sea_orm_active_enums::UserStatus, transactions};
use brokerdesk_db::repositories::{
    NewTransaction, TransactionFilter, TransactionPage, TransactionUpdate,
};
use brokerdesk_db::{InsuranceCompanyRepository, TransactionRepository, UserRepository};
use brokerdesk_shared::{ObjectRef, types::pagination::MAX_PAGE_SIZE};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Envelope, created, ok};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{Caller, JsonBody, PathParam},
};

/// Creates the transaction routes, relative to `/transaction`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transaction))
        .route("/table", post(transaction_table))
        .route(
            "/{transaction_id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording a sale.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Seller; defaults to the caller.
    pub user_id: Option<i64>,
    /// Insurer the policy was sold for.
    pub insurance_company_id: i64,
    /// Plate number.
    pub vehicle_id: String,
    /// Vehicle model.
    pub vehicle_model: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Premium in won.
    pub price: i64,
    /// Optional note.
    pub memo: Option<String>,
}

/// Request body for changing a sale.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    /// New seller; needs ARW.
    pub user_id: Option<i64>,
    /// New insurer.
    pub insurance_company_id: Option<i64>,
    /// New plate number.
    pub vehicle_id: Option<String>,
    /// New vehicle model.
    pub vehicle_model: Option<String>,
    /// New sale date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// New premium.
    pub price: Option<i64>,
    /// New note.
    pub memo: Option<String>,
    /// Cancellation flag.
    pub canceled: Option<bool>,
    /// Fee kept on cancellation; required when canceling.
    pub cancel_fee: Option<i64>,
}

impl UpdateTransactionRequest {
    /// Validates the given fields and converts them into a repository update.
    fn into_update(self) -> ApiResult<TransactionUpdate> {
        if let Some(vehicle_id) = &self.vehicle_id {
            validate_vehicle_id(vehicle_id)?;
        }
        if let Some(vehicle_model) = &self.vehicle_model {
            validate_vehicle_model(vehicle_model)?;
        }
        if let Some(memo) = &self.memo {
            validate_memo(memo)?;
        }
        if self.canceled == Some(true) && self.cancel_fee.unwrap_or(0) == 0 {
            return Err(ApiError::validation(
                "A canceled transaction needs a cancellation fee",
            ));
        }
        let date = self.date.as_deref().map(parse_date).transpose()?;

        let update = TransactionUpdate {
            user_id: self.user_id,
            insurance_company_id: self.insurance_company_id,
            vehicle_id: self.vehicle_id,
            vehicle_model: self.vehicle_model,
            date,
            price: self.price,
            memo: self.memo,
            canceled: self.canceled,
            cancel_fee: self.cancel_fee,
        };
        if update.is_empty() {
            return Err(ApiError::validation("Nothing to update"));
        }
        Ok(update)
    }
}

/// A single sale.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction id.
    pub id: i64,
    /// Seller.
    pub user_id: i64,
    /// Insurer.
    pub insurance_company_id: i64,
    /// Plate number.
    pub vehicle_id: String,
    /// Vehicle model.
    pub vehicle_model: String,
    /// Sale date.
    pub date: NaiveDate,
    /// Premium in won.
    pub price: i64,
    /// Note.
    pub memo: String,
    /// True once canceled.
    pub canceled: bool,
    /// Fee kept on cancellation.
    pub cancel_fee: i64,
    /// When the row was recorded.
    pub created_at: DateTime<Utc>,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            insurance_company_id: model.insurance_company_id,
            vehicle_id: model.vehicle_id,
            vehicle_model: model.vehicle_model,
            date: model.date,
            price: model.price,
            memo: model.memo,
            canceled: model.canceled,
            cancel_fee: model.cancel_fee,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Checks that a sale may be assigned to `user_id`.
async fn ensure_assignable(state: &AppState, caller: &Caller, user_id: i64) -> ApiResult<()> {
    if !caller.permissions.transaction.writes_all() {
        return Err(ApiError::forbidden());
    }
    UserRepository::new((*state.db).clone())
        .find_with_status(user_id, &[UserStatus::Accepted])
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("The member does not exist or has not been approved"))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transaction - Record a sale.
async fn create_transaction(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<CreateTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_vehicle_id(&payload.vehicle_id)?;
    validate_vehicle_model(&payload.vehicle_model)?;
    let date = parse_date(&payload.date)?;
    if let Some(memo) = &payload.memo {
        validate_memo(memo)?;
    }

    if caller.permissions.transaction == TransactionAccess::Ar {
        return Err(ApiError::forbidden());
    }
    let user_id = match payload.user_id {
        Some(user_id) => {
            ensure_assignable(&state, &caller, user_id).await?;
            user_id
        }
        None => caller.user_id,
    };

    let transaction = TransactionRepository::new((*state.db).clone())
        .create(NewTransaction {
            user_id,
            insurance_company_id: payload.insurance_company_id,
            vehicle_id: payload.vehicle_id,
            vehicle_model: payload.vehicle_model,
            date,
            price: payload.price,
            memo: payload.memo.unwrap_or_default(),
        })
        .await?;

    info!(
        transaction_id = %transaction.id,
        user_id = %user_id,
        created_by = %caller.user_id,
        "Transaction recorded"
    );
    Ok(created(transaction.id))
}

/// POST /transaction/table - One filtered, sorted page of sales.
async fn transaction_table(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(mut filter): JsonBody<TransactionFilter>,
) -> ApiResult<Envelope<TransactionPage>> {
    if !(1..=MAX_PAGE_SIZE).contains(&filter.page.limit) {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
        && start > end
    {
        return Err(ApiError::validation(
            "The start date must not be after the end date",
        ));
    }

    if caller.permissions.transaction.is_self_scoped() {
        if filter.user_id.is_some() {
            return Err(ApiError::forbidden());
        }
        filter.user_id = Some(caller.user_id);
    } else if let Some(user_id) = filter.user_id {
        UserRepository::new((*state.db).clone())
            .find_with_status(user_id, &[UserStatus::Accepted, UserStatus::Deleted])
            .await?
            .ok_or_else(|| ApiError::not_found("The member does not exist"))?;
    }
    if let Some(company_id) = filter.insurance_company_id {
        InsuranceCompanyRepository::new((*state.db).clone())
            .get(company_id)
            .await?;
    }

    let page = TransactionRepository::new((*state.db).clone())
        .table(&filter)
        .await?;
    Ok(ok(page))
}

/// GET /transaction/{transaction_id}
async fn get_transaction(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(transaction_id): PathParam<i64>,
) -> ApiResult<Envelope<TransactionResponse>> {
    let transaction = TransactionRepository::new((*state.db).clone())
        .get(transaction_id)
        .await?;
    if !can_read_row(
        caller.permissions.transaction,
        caller.user_id,
        transaction.user_id,
    ) {
        return Err(ApiError::forbidden());
    }
    Ok(ok(transaction.into()))
}

/// PUT /transaction/{transaction_id}
async fn update_transaction(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(transaction_id): PathParam<i64>,
    JsonBody(payload): JsonBody<UpdateTransactionRequest>,
) -> ApiResult<Envelope<ObjectRef>> {
    let update = payload.into_update()?;

    let repo = TransactionRepository::new((*state.db).clone());
    let transaction = repo.get(transaction_id).await?;
    if !can_write_row(
        caller.permissions.transaction,
        caller.user_id,
        transaction.user_id,
    ) {
        return Err(ApiError::forbidden());
    }
    if let Some(user_id) = update.user_id
        && user_id != transaction.user_id
    {
        ensure_assignable(&state, &caller, user_id).await?;
    }

    let updated = repo.update(transaction, update).await?;
    info!(transaction_id = %updated.id, updated_by = %caller.user_id, "Transaction updated");
    Ok(ok(ObjectRef::Updated(updated.id)))
}

/// DELETE /transaction/{transaction_id}
async fn delete_transaction(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(transaction_id): PathParam<i64>,
) -> ApiResult<Envelope<ObjectRef>> {
    let repo = TransactionRepository::new((*state.db).clone());
    let transaction = repo.get(transaction_id).await?;
    if !can_write_row(
        caller.permissions.transaction,
        caller.user_id,
        transaction.user_id,
    ) {
        return Err(ApiError::forbidden());
    }

    repo.delete(transaction_id).await?;
    info!(transaction_id = %transaction_id, deleted_by = %caller.user_id, "Transaction deleted");
    Ok(ok(ObjectRef::Deleted(transaction_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_rejected() {
        let err = UpdateTransactionRequest::default().into_update().unwrap_err();
        assert_eq!(err.0.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_cancel_needs_fee() {
        let payload = UpdateTransactionRequest {
            canceled: Some(true),
            ..UpdateTransactionRequest::default()
        };
        assert!(payload.into_update().is_err());

        let payload = UpdateTransactionRequest {
            canceled: Some(true),
            cancel_fee: Some(30_000),
            ..UpdateTransactionRequest::default()
        };
        let update = payload.into_update().unwrap();
        assert_eq!(update.cancel_fee, Some(30_000));
    }

    #[test]
    fn test_uncancel_without_fee_is_allowed() {
        let payload = UpdateTransactionRequest {
            canceled: Some(false),
            ..UpdateTransactionRequest::default()
        };
        assert_eq!(payload.into_update().unwrap().canceled, Some(false));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let payload = UpdateTransactionRequest {
            date: Some("2024-13-01".to_string()),
            ..UpdateTransactionRequest::default()
        };
        assert!(payload.into_update().is_err());
    }

    #[test]
    fn test_table_filter_defaults() {
        let filter: TransactionFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.page.page, 0);
        assert_eq!(filter.page.limit, 15);

        let filter: TransactionFilter = serde_json::from_str(
            r#"{"canceled_type": "CANCELED_ONLY", "order_by": "price", "order_type": "asc", "limit": 30}"#,
        )
        .unwrap();
        assert_eq!(filter.page.limit, 30);
    }
}
