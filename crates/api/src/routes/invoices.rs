//! Monthly invoice routes: member and company extras, settlement snapshots
//! and the company-wide monthly figures.

use axum::{
    Router,
    extract::State,
    response::IntoResponse,
    routing::{get, put},
};
use brokerdesk_core::invoice::{CompanyInvoiceSummary, UserInvoiceSummary};
use brokerdesk_core::period::Period;
use brokerdesk_core::permission::{AccessLevel, can_read_row};
use brokerdesk_core::validation::validate_extra_name;
use brokerdesk_db::repositories::ExtraItem;
use brokerdesk_db::{InvoiceRepository, UserRepository};
use brokerdesk_shared::ObjectRef;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Envelope, created, ok};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{Caller, JsonBody, PathParam, QueryParams},
};

/// Creates the invoice routes, relative to `/invoice`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user/extra",
            get(list_user_extras).post(create_user_extra),
        )
        .route(
            "/user/extra/{extra_id}",
            put(update_user_extra).delete(delete_user_extra),
        )
        .route("/user", get(get_user_invoice).post(settle_user_invoice))
        .route(
            "/company/extra",
            get(list_company_extras).post(create_company_extra),
        )
        .route(
            "/company/extra/{extra_id}",
            put(update_company_extra).delete(delete_company_extra),
        )
        .route(
            "/company",
            get(get_company_invoice).post(settle_company_invoice),
        )
        .route("/monthly/cancel_fee", get(monthly_cancel_fee))
        .route("/monthly/revenue", get(monthly_revenue))
        .route("/monthly/plate_fee", get(monthly_plate_fee))
        .route("/monthly/employee_salary", get(monthly_employee_salary))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// `year` and `month` as sent in a query string.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Four-digit year.
    pub year: String,
    /// Month, with or without a leading zero.
    pub month: String,
}

impl PeriodQuery {
    fn period(&self) -> ApiResult<Period> {
        Ok(Period::parse(&self.year, &self.month)?)
    }
}

/// Member and month selected by a query string; the member defaults to the caller.
#[derive(Debug, Deserialize)]
pub struct MemberPeriodQuery {
    /// Member to look up.
    pub user_id: Option<i64>,
    /// Four-digit year.
    pub year: String,
    /// Month, with or without a leading zero.
    pub month: String,
}

impl MemberPeriodQuery {
    /// Resolves the member the caller may see and the requested month.
    fn resolve(&self, caller: &Caller) -> ApiResult<(i64, Period)> {
        let period = Period::parse(&self.year, &self.month)?;
        let user_id = self.user_id.unwrap_or(caller.user_id);
        if !can_read_row(caller.permissions.invoice, caller.user_id, user_id) {
            return Err(ApiError::forbidden());
        }
        Ok((user_id, period))
    }
}

/// Body of `POST /invoice/user/extra`.
#[derive(Debug, Deserialize)]
pub struct CreateUserExtraRequest {
    /// Member the line belongs to.
    pub user_id: i64,
    /// Invoice year.
    pub year: i32,
    /// Invoice month.
    pub month: u32,
    /// Label, 2 to 15 characters.
    pub name: String,
    /// Signed amount in won.
    pub price: i64,
}

/// Body of `POST /invoice/company/extra`.
#[derive(Debug, Deserialize)]
pub struct CreateCompanyExtraRequest {
    /// Invoice year.
    pub year: i32,
    /// Invoice month.
    pub month: u32,
    /// Label, 2 to 15 characters.
    pub name: String,
    /// Signed amount in won.
    pub price: i64,
}

/// Body of the extra update routes.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExtraRequest {
    /// New label.
    pub name: Option<String>,
    /// New amount.
    pub price: Option<i64>,
}

impl UpdateExtraRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.name.is_none() && self.price.is_none() {
            return Err(ApiError::validation("Nothing to update"));
        }
        if let Some(name) = &self.name {
            validate_extra_name(name)?;
        }
        Ok(())
    }
}

/// Body of `POST /invoice/user`.
#[derive(Debug, Deserialize)]
pub struct SettleUserRequest {
    /// Member to settle.
    pub user_id: i64,
    /// Invoice year.
    pub year: i32,
    /// Invoice month.
    pub month: u32,
}

/// Body of `POST /invoice/company`.
#[derive(Debug, Deserialize)]
pub struct SettleCompanyRequest {
    /// Invoice year.
    pub year: i32,
    /// Invoice month.
    pub month: u32,
    /// Office rent for the month.
    pub rental_fee: i64,
    /// Office upkeep for the month.
    pub maintenance_fee: i64,
}

/// `{cancel_fee}` of a month.
#[derive(Debug, Serialize)]
pub struct CancelFeeResponse {
    /// Cancellation fees kept.
    pub cancel_fee: i64,
}

/// `{revenue}` of a month.
#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    /// Revenue of sales that were not canceled.
    pub revenue: i64,
}

/// `{plate_fee}` of a month.
#[derive(Debug, Serialize)]
pub struct PlateFeeResponse {
    /// Plate fees on settled member invoices.
    pub plate_fee: i64,
}

/// `{employee_salary}` of a month.
#[derive(Debug, Serialize)]
pub struct EmployeeSalaryResponse {
    /// Incomes on settled member invoices.
    pub employee_salary: i64,
}

fn require_invoice_admin(caller: &Caller) -> ApiResult<()> {
    if caller.permissions.invoice.writes_all() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

fn repo(state: &AppState) -> InvoiceRepository {
    InvoiceRepository::new((*state.db).clone())
}

// ============================================================================
// Member extras
// ============================================================================

/// POST /invoice/user/extra
async fn create_user_extra(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<CreateUserExtraRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = Period::new(payload.year, payload.month)?;
    validate_extra_name(&payload.name)?;
    require_invoice_admin(&caller)?;

    let extra = repo(&state)
        .create_user_extra(payload.user_id, period, &payload.name, payload.price)
        .await?;
    info!(extra_id = %extra.id, user_id = %payload.user_id, "Member extra created");
    Ok(created(extra.id))
}

/// GET /invoice/user/extra
async fn list_user_extras(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<MemberPeriodQuery>,
) -> ApiResult<Envelope<Vec<ExtraItem>>> {
    let (user_id, period) = query.resolve(&caller)?;
    let extras = repo(&state).list_user_extras(user_id, period).await?;
    Ok(ok(extras))
}

/// PUT /invoice/user/extra/{extra_id}
async fn update_user_extra(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(extra_id): PathParam<i64>,
    JsonBody(payload): JsonBody<UpdateExtraRequest>,
) -> ApiResult<Envelope<ObjectRef>> {
    payload.validate()?;
    require_invoice_admin(&caller)?;

    let extra = repo(&state)
        .update_user_extra(extra_id, payload.name, payload.price)
        .await?;
    info!(extra_id = %extra.id, "Member extra updated");
    Ok(ok(ObjectRef::Updated(extra.id)))
}

/// DELETE /invoice/user/extra/{extra_id}
async fn delete_user_extra(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(extra_id): PathParam<i64>,
) -> ApiResult<Envelope<ObjectRef>> {
    require_invoice_admin(&caller)?;

    repo(&state).delete_user_extra(extra_id).await?;
    info!(extra_id = %extra_id, "Member extra deleted");
    Ok(ok(ObjectRef::Deleted(extra_id)))
}

// ============================================================================
// Member invoices
// ============================================================================

/// POST /invoice/user - Settle a member's month.
async fn settle_user_invoice(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<SettleUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = Period::new(payload.year, payload.month)?;
    require_invoice_admin(&caller)?;

    let invoice = repo(&state)
        .settle_user_invoice(payload.user_id, period)
        .await?;
    info!(
        invoice_id = %invoice.id,
        user_id = %payload.user_id,
        year = period.year,
        month = period.month,
        settled_by = %caller.user_id,
        "Member invoice settled"
    );
    Ok(created(invoice.id))
}

/// GET /invoice/user - The settled snapshot, or the live calculation.
async fn get_user_invoice(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<MemberPeriodQuery>,
) -> ApiResult<Envelope<UserInvoiceSummary>> {
    let (user_id, period) = query.resolve(&caller)?;
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("The account does not exist or has been withdrawn"))?;

    let summary = repo(&state).user_invoice(&user, period).await?;
    Ok(ok(summary))
}

// ============================================================================
// Company extras
// ============================================================================

/// POST /invoice/company/extra
async fn create_company_extra(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<CreateCompanyExtraRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = Period::new(payload.year, payload.month)?;
    validate_extra_name(&payload.name)?;
    require_invoice_admin(&caller)?;

    let extra = repo(&state)
        .create_company_extra(period, &payload.name, payload.price)
        .await?;
    info!(extra_id = %extra.id, "Company extra created");
    Ok(created(extra.id))
}

/// GET /invoice/company/extra
async fn list_company_extras(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Envelope<Vec<ExtraItem>>> {
    let period = query.period()?;
    if !caller.permissions.invoice.reads_all() {
        return Err(ApiError::forbidden());
    }

    Ok(ok(repo(&state).list_company_extras(period).await?))
}

/// PUT /invoice/company/extra/{extra_id}
async fn update_company_extra(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(extra_id): PathParam<i64>,
    JsonBody(payload): JsonBody<UpdateExtraRequest>,
) -> ApiResult<Envelope<ObjectRef>> {
    payload.validate()?;
    require_invoice_admin(&caller)?;

    let extra = repo(&state)
        .update_company_extra(extra_id, payload.name, payload.price)
        .await?;
    info!(extra_id = %extra.id, "Company extra updated");
    Ok(ok(ObjectRef::Updated(extra.id)))
}

/// DELETE /invoice/company/extra/{extra_id}
async fn delete_company_extra(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(extra_id): PathParam<i64>,
) -> ApiResult<Envelope<ObjectRef>> {
    require_invoice_admin(&caller)?;

    repo(&state).delete_company_extra(extra_id).await?;
    info!(extra_id = %extra_id, "Company extra deleted");
    Ok(ok(ObjectRef::Deleted(extra_id)))
}

// ============================================================================
// Company invoices
// ============================================================================

/// POST /invoice/company - Settle the company's month.
async fn settle_company_invoice(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<SettleCompanyRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = Period::new(payload.year, payload.month)?;
    require_invoice_admin(&caller)?;

    let repo = repo(&state);
    repo.ensure_members_settled(period).await?;
    let invoice = repo
        .settle_company_invoice(period, payload.rental_fee, payload.maintenance_fee)
        .await?;
    info!(
        invoice_id = %invoice.id,
        year = period.year,
        month = period.month,
        income = invoice.income,
        "Company invoice settled"
    );
    Ok(created(invoice.id))
}

/// GET /invoice/company
async fn get_company_invoice(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Envelope<CompanyInvoiceSummary>> {
    let period = query.period()?;
    require_invoice_admin(&caller)?;

    let repo = repo(&state);
    repo.ensure_members_settled(period).await?;
    Ok(ok(repo.company_invoice(period).await?))
}

// ============================================================================
// Monthly figures
// ============================================================================

/// GET /invoice/monthly/cancel_fee
async fn monthly_cancel_fee(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Envelope<CancelFeeResponse>> {
    let period = query.period()?;
    require_invoice_admin(&caller)?;

    let figures = repo(&state).monthly_figures(period).await?;
    Ok(ok(CancelFeeResponse {
        cancel_fee: figures.cancel_fee,
    }))
}

/// GET /invoice/monthly/revenue
async fn monthly_revenue(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Envelope<RevenueResponse>> {
    let period = query.period()?;
    require_invoice_admin(&caller)?;

    let figures = repo(&state).monthly_figures(period).await?;
    Ok(ok(RevenueResponse {
        revenue: figures.revenue,
    }))
}

/// GET /invoice/monthly/plate_fee
async fn monthly_plate_fee(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Envelope<PlateFeeResponse>> {
    let period = query.period()?;
    require_invoice_admin(&caller)?;

    let repo = repo(&state);
    repo.ensure_members_settled(period).await?;
    let (plate_fee, _) = repo.settled_payroll(period).await?;
    Ok(ok(PlateFeeResponse { plate_fee }))
}

/// GET /invoice/monthly/employee_salary
async fn monthly_employee_salary(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Envelope<EmployeeSalaryResponse>> {
    let period = query.period()?;
    require_invoice_admin(&caller)?;

    let repo = repo(&state);
    repo.ensure_members_settled(period).await?;
    let (_, employee_salary) = repo.settled_payroll(period).await?;
    Ok(ok(EmployeeSalaryResponse { employee_salary }))
}
