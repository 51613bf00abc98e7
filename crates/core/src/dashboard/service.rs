//! Period-over-period comparisons for the dashboard.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::types::{
    CompanyRate, CountComparison, MemberRevenueRate, MemberShareInput, MonthlyRevenue,
    RevenueComparison,
};
use crate::period::Period;
use brokerdesk_shared::AppError;

/// Dashboard input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// Month range must be at least one.
    #[error("Month range must be a positive number")]
    InvalidMonthRange,
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Dashboard aggregation logic.
pub struct DashboardService;

impl DashboardService {
    /// Percent change from `previous` to `current`, rounded half to even.
    ///
    /// Zero when nothing changed or there is no previous value to compare with.
    #[must_use]
    pub fn difference_percentage(current: i64, previous: i64) -> i64 {
        if current == previous || previous == 0 {
            return 0;
        }
        let change = Decimal::from(current - previous) * Decimal::ONE_HUNDRED / Decimal::from(previous);
        to_whole(change, RoundingStrategy::MidpointNearestEven)
    }

    /// `part` as a whole percentage of `total`, rounded half away from zero.
    #[must_use]
    pub fn share_percentage(part: i64, total: i64) -> i64 {
        if total == 0 {
            return 0;
        }
        let share = Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(total);
        to_whole(share, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Builds a revenue comparison.
    #[must_use]
    pub fn compare_revenue(current: i64, previous: i64) -> RevenueComparison {
        RevenueComparison {
            revenue: current,
            difference_percentage: Self::difference_percentage(current, previous),
        }
    }

    /// Builds a transaction count comparison.
    #[must_use]
    pub const fn compare_count(current: i64, previous: i64) -> CountComparison {
        CountComparison {
            transaction_count: current,
            difference_count: current - previous,
        }
    }

    /// The settled months shown before the current one, or `None` when only the
    /// current month is requested.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidMonthRange` when `month_range` is below one.
    pub fn history_window(
        current: Period,
        month_range: i64,
    ) -> Result<Option<(Period, Period)>, DashboardError> {
        let range = u32::try_from(month_range)
            .ok()
            .filter(|r| *r > 0)
            .ok_or(DashboardError::InvalidMonthRange)?;
        if range == 1 {
            return Ok(None);
        }
        Ok(Some((current.months_back(range - 1), current.previous())))
    }

    /// Orders the settled history ascending and appends the live current month.
    #[must_use]
    pub fn revenue_series(
        mut history: Vec<MonthlyRevenue>,
        current: Period,
        current_revenue: i64,
    ) -> Vec<MonthlyRevenue> {
        history.sort_by_key(|m| (m.year, m.month));
        history.push(MonthlyRevenue {
            year: current.year,
            month: current.month,
            revenue: current_revenue,
        });
        history
    }

    /// Each member's share of this month's revenue and its change from last month.
    ///
    /// Members absent from last month's settlement show no change.
    #[must_use]
    pub fn member_revenue_rates(
        current: &[MemberShareInput],
        previous: &[MemberShareInput],
    ) -> Vec<MemberRevenueRate> {
        let current_total: i64 = current.iter().map(|m| m.revenue).sum();
        let previous_total: i64 = previous.iter().map(|m| m.revenue).sum();
        let previous_share: HashMap<i64, i64> = previous
            .iter()
            .map(|m| (m.user_id, Self::share_percentage(m.revenue, previous_total)))
            .collect();

        let mut rates: Vec<MemberRevenueRate> = current
            .iter()
            .map(|m| {
                let percentage = Self::share_percentage(m.revenue, current_total);
                let difference_percentage = previous_share
                    .get(&m.user_id)
                    .map_or(0, |before| percentage - before);
                MemberRevenueRate {
                    user_name: m.user_name.clone(),
                    percentage,
                    difference_percentage,
                }
            })
            .collect();
        rates.sort_by(|a, b| {
            b.percentage
                .cmp(&a.percentage)
                .then_with(|| a.user_name.cmp(&b.user_name))
        });
        rates
    }

    /// Each insurance company's share of this month's transactions and its change
    /// from last month, largest gain first.
    ///
    /// Companies with no transactions last month show no change.
    #[must_use]
    pub fn company_rates(current: &[(String, i64)], previous: &[(String, i64)]) -> Vec<CompanyRate> {
        let current_total: i64 = current.iter().map(|(_, count)| count).sum();
        let previous_total: i64 = previous.iter().map(|(_, count)| count).sum();
        let previous_share: HashMap<&str, i64> = previous
            .iter()
            .map(|(name, count)| (name.as_str(), Self::share_percentage(*count, previous_total)))
            .collect();

        let mut rates: Vec<CompanyRate> = current
            .iter()
            .map(|(name, count)| {
                let percentage = Self::share_percentage(*count, current_total);
                let difference_percentage = previous_share
                    .get(name.as_str())
                    .map_or(0, |before| percentage - before);
                CompanyRate {
                    company_name: name.clone(),
                    percentage,
                    difference_percentage,
                }
            })
            .collect();
        rates.sort_by(|a, b| {
            b.difference_percentage
                .cmp(&a.difference_percentage)
                .then_with(|| a.company_name.cmp(&b.company_name))
        });
        rates
    }
}

fn to_whole(value: Decimal, strategy: RoundingStrategy) -> i64 {
    value
        .round_dp_with_strategy(0, strategy)
        .to_i64()
        .unwrap_or_default()
}
