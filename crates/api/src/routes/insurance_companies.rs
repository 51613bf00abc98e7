//! Insurance company routes.

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use brokerdesk_core::permission::AccessLevel;
use brokerdesk_core::validation::validate_company_name;
use brokerdesk_db::InsuranceCompanyRepository;
use brokerdesk_db::entities::insurance_companies;
use brokerdesk_shared::ObjectRef;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Envelope, created, ok};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{Caller, JsonBody, PathParam},
};

/// Creates the insurance company routes, relative to `/transaction`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/insurancecompany", get(list_companies).post(create_company))
        .route(
            "/insurancecompany/{company_id}",
            get(get_company).put(update_company).delete(delete_company),
        )
}

/// Company name payload for create and update.
#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    /// Company name.
    pub name: String,
}

/// An insurance company as listed to clients.
#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    /// Company id.
    pub id: i64,
    /// Company name.
    pub name: String,
}

impl From<insurance_companies::Model> for CompanyResponse {
    fn from(model: insurance_companies::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

fn require_transaction_admin(caller: &Caller) -> ApiResult<()> {
    if caller.permissions.transaction.writes_all() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

/// POST /transaction/insurancecompany
async fn create_company(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<CompanyRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_company_name(&payload.name)?;
    require_transaction_admin(&caller)?;

    let company = InsuranceCompanyRepository::new((*state.db).clone())
        .create(&payload.name)
        .await?;
    info!(company_id = %company.id, created_by = %caller.user_id, "Insurance company created");
    Ok(created(company.id))
}

/// GET /transaction/insurancecompany
async fn list_companies(
    State(state): State<AppState>,
    _caller: Caller,
) -> ApiResult<Envelope<Vec<CompanyResponse>>> {
    let companies = InsuranceCompanyRepository::new((*state.db).clone())
        .list()
        .await?;
    Ok(ok(companies.into_iter().map(CompanyResponse::from).collect()))
}

/// GET /transaction/insurancecompany/{company_id}
async fn get_company(
    State(state): State<AppState>,
    _caller: Caller,
    PathParam(company_id): PathParam<i64>,
) -> ApiResult<Envelope<CompanyResponse>> {
    let company = InsuranceCompanyRepository::new((*state.db).clone())
        .get(company_id)
        .await?;
    Ok(ok(company.into()))
}

/// PUT /transaction/insurancecompany/{company_id}
async fn update_company(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(company_id): PathParam<i64>,
    JsonBody(payload): JsonBody<CompanyRequest>,
) -> ApiResult<Envelope<ObjectRef>> {
    validate_company_name(&payload.name)?;
    require_transaction_admin(&caller)?;

    let company = InsuranceCompanyRepository::new((*state.db).clone())
        .rename(company_id, &payload.name)
        .await?;
    info!(company_id = %company.id, "Insurance company renamed");
    Ok(ok(ObjectRef::Updated(company.id)))
}

/// DELETE /transaction/insurancecompany/{company_id}
async fn delete_company(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(company_id): PathParam<i64>,
) -> ApiResult<Envelope<ObjectRef>> {
    require_transaction_admin(&caller)?;

    InsuranceCompanyRepository::new((*state.db).clone())
        .delete(company_id)
        .await?;
    info!(company_id = %company_id, "Insurance company deleted");
    Ok(ok(ObjectRef::Deleted(company_id)))
}
