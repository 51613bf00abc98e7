//! Dashboard routes: revenue and sales comparisons for the current month and day.

use axum::{Router, extract::State, routing::get};
use brokerdesk_core::dashboard::{
    CompanyRate, CountComparison, DashboardService, MemberRevenue, MemberRevenueRate,
    MonthlyRevenue, RevenueComparison,
};
use brokerdesk_core::period::Period;
use brokerdesk_core::permission::AccessLevel;
use brokerdesk_db::DashboardRepository;
use chrono::NaiveDate;
use serde::Serialize;

use super::{Envelope, ok};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{Caller, PathParam},
};

/// Creates the dashboard routes, relative to `/dashboard`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/current-month-revenue", get(current_month_revenue))
        .route("/current-day-revenue", get(current_day_revenue))
        .route(
            "/current-month-transaction-count",
            get(current_month_transaction_count),
        )
        .route(
            "/current-day-transaction-count",
            get(current_day_transaction_count),
        )
        .route("/monthly-revenue/{month_range}", get(monthly_revenue))
        .route("/monthly-member-revenue", get(monthly_member_revenue))
        .route(
            "/current-month-member-revenue-rate",
            get(current_month_member_revenue_rate),
        )
        .route(
            "/current-month-invoice-company-rate",
            get(current_month_company_rate),
        )
}

// ============================================================================
// Response Types
// ============================================================================

/// `{revenue_list}`.
#[derive(Debug, Serialize)]
pub struct RevenueList {
    /// Oldest month first.
    pub revenue_list: Vec<MonthlyRevenue>,
}

/// `{user_list}`.
#[derive(Debug, Serialize)]
pub struct UserList<T> {
    /// One entry per member.
    pub user_list: Vec<T>,
}

/// `{company_list}`.
#[derive(Debug, Serialize)]
pub struct CompanyList {
    /// Largest gain first.
    pub company_list: Vec<CompanyRate>,
}

// ============================================================================
// Date windows
// ============================================================================

/// Inclusive date range.
type Window = (NaiveDate, NaiveDate);

/// Month-to-date and the whole previous month.
fn month_windows(today: NaiveDate) -> (Window, Window) {
    let current = Period::from_date(today);
    let previous = current.previous();
    (
        (current.first_day(), today),
        (previous.first_day(), previous.last_day()),
    )
}

/// Today and yesterday.
fn day_windows(today: NaiveDate) -> (Window, Window) {
    let yesterday = today.pred_opt().unwrap_or(today);
    ((today, today), (yesterday, yesterday))
}

fn require_user_admin(caller: &Caller) -> ApiResult<()> {
    if caller.permissions.user.writes_all() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

fn repo(state: &AppState) -> DashboardRepository {
    DashboardRepository::new((*state.db).clone())
}

async fn compare_revenue(
    state: &AppState,
    (current, previous): (Window, Window),
) -> ApiResult<RevenueComparison> {
    let repo = repo(state);
    let now = repo.revenue_between(current.0, current.1).await?;
    let before = repo.revenue_between(previous.0, previous.1).await?;
    Ok(DashboardService::compare_revenue(now, before))
}

async fn compare_count(
    state: &AppState,
    (current, previous): (Window, Window),
) -> ApiResult<CountComparison> {
    let repo = repo(state);
    let now = repo.transaction_count_between(current.0, current.1).await?;
    let before = repo
        .transaction_count_between(previous.0, previous.1)
        .await?;
    Ok(DashboardService::compare_count(now, before))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /dashboard/current-month-revenue
async fn current_month_revenue(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<RevenueComparison>> {
    require_user_admin(&caller)?;
    let windows = month_windows(state.settings.today());
    Ok(ok(compare_revenue(&state, windows).await?))
}

/// GET /dashboard/current-day-revenue
async fn current_day_revenue(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<RevenueComparison>> {
    require_user_admin(&caller)?;
    let windows = day_windows(state.settings.today());
    Ok(ok(compare_revenue(&state, windows).await?))
}

/// GET /dashboard/current-month-transaction-count
async fn current_month_transaction_count(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<CountComparison>> {
    require_user_admin(&caller)?;
    let windows = month_windows(state.settings.today());
    Ok(ok(compare_count(&state, windows).await?))
}

/// GET /dashboard/current-day-transaction-count
async fn current_day_transaction_count(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<CountComparison>> {
    require_user_admin(&caller)?;
    let windows = day_windows(state.settings.today());
    Ok(ok(compare_count(&state, windows).await?))
}

/// GET /dashboard/monthly-revenue/{month_range}
///
/// Settled revenue of the `month_range - 1` months before this one, followed by
/// this month's live revenue.
async fn monthly_revenue(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(month_range): PathParam<i64>,
) -> ApiResult<Envelope<RevenueList>> {
    require_user_admin(&caller)?;
    let today = state.settings.today();
    let current = Period::from_date(today);
    let window = DashboardService::history_window(current, month_range)?;

    let repo = repo(&state);
    let history = match window {
        Some((from, to)) => repo.settled_revenue_history(from, to).await?,
        None => Vec::new(),
    };
    let current_revenue = repo.revenue_between(current.first_day(), today).await?;

    Ok(ok(RevenueList {
        revenue_list: DashboardService::revenue_series(history, current, current_revenue),
    }))
}

/// GET /dashboard/monthly-member-revenue
async fn monthly_member_revenue(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<UserList<MemberRevenue>>> {
    require_user_admin(&caller)?;
    let ((start, end), _) = month_windows(state.settings.today());

    let user_list = repo(&state).member_revenue(start, end).await?;
    Ok(ok(UserList { user_list }))
}

/// GET /dashboard/current-month-member-revenue-rate
async fn current_month_member_revenue_rate(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<UserList<MemberRevenueRate>>> {
    require_user_admin(&caller)?;
    let today = state.settings.today();
    let ((start, end), _) = month_windows(today);

    let repo = repo(&state);
    let current = repo.member_revenue_between(start, end).await?;
    let previous = repo
        .settled_member_revenue(Period::from_date(today).previous())
        .await?;

    Ok(ok(UserList {
        user_list: DashboardService::member_revenue_rates(&current, &previous),
    }))
}

/// GET /dashboard/current-month-invoice-company-rate
async fn current_month_company_rate(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<CompanyList>> {
    require_user_admin(&caller)?;
    let (current, previous) = month_windows(state.settings.today());

    let repo = repo(&state);
    let now = repo.company_counts_between(current.0, current.1).await?;
    let before = repo.company_counts_between(previous.0, previous.1).await?;

    Ok(ok(CompanyList {
        company_list: DashboardService::company_rates(&now, &before),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_windows_cover_whole_previous_month() {
        let (current, previous) = month_windows(date(2024, 3, 15));
        assert_eq!(current, (date(2024, 3, 1), date(2024, 3, 15)));
        assert_eq!(previous, (date(2024, 2, 1), date(2024, 2, 29)));
    }

    #[test]
    fn test_month_windows_cross_the_year() {
        let (_, previous) = month_windows(date(2024, 1, 2));
        assert_eq!(previous, (date(2023, 12, 1), date(2023, 12, 31)));
    }

    #[test]
    fn test_day_windows() {
        let (today, yesterday) = day_windows(date(2024, 3, 1));
        assert_eq!(today, (date(2024, 3, 1), date(2024, 3, 1)));
        assert_eq!(yesterday, (date(2024, 2, 29), date(2024, 2, 29)));
    }

    #[test]
    fn test_lists_serialize_under_their_keys() {
        let body = serde_json::to_value(CompanyList {
            company_list: Vec::new(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "company_list": [] }));
    }
}
