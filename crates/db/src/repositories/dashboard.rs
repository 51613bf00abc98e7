//! Dashboard repository: read-only aggregates over the ledger and settled invoices.
//!
//! Sums are folded in Rust over narrow column tuples so that every figure
//! stays an `i64` regardless of how Postgres types `SUM(bigint)`.

use std::collections::{BTreeMap, HashMap};

use brokerdesk_core::Period;
use brokerdesk_core::dashboard::{MemberRevenue, MemberShareInput, MonthlyRevenue};
use brokerdesk_core::invoice::MonthlyTotals;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect,
};

use super::transaction::totals_between;
use super::{period_from_key, period_key};
use crate::entities::{insurance_companies, transactions, user_invoices, users};

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Revenue of the sales dated `start..=end`.
    pub async fn revenue_between(&self, start: NaiveDate, end: NaiveDate) -> Result<i64, DbErr> {
        Ok(totals_between(&self.db, None, start, end)
            .await?
            .total_revenue())
    }

    /// Number of sales dated `start..=end`, canceled ones included.
    pub async fn transaction_count_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, DbErr> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::Date.between(start, end))
            .count(&self.db)
            .await?;
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    /// Revenue per member over `start..=end`, members without sales omitted.
    pub async fn member_revenue_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MemberShareInput>, DbErr> {
        let rows: Vec<(i64, i64, i64, bool)> = transactions::Entity::find()
            .filter(transactions::Column::Date.between(start, end))
            .select_only()
            .column(transactions::Column::UserId)
            .column(transactions::Column::Price)
            .column(transactions::Column::CancelFee)
            .column(transactions::Column::Canceled)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut per_user: BTreeMap<i64, Vec<(i64, i64, bool)>> = BTreeMap::new();
        for (user_id, price, cancel_fee, canceled) in rows {
            per_user
                .entry(user_id)
                .or_default()
                .push((price, cancel_fee, canceled));
        }

        let names = self.user_names(per_user.keys().copied().collect()).await?;
        Ok(per_user
            .into_iter()
            .map(|(user_id, rows)| MemberShareInput {
                user_id,
                user_name: names.get(&user_id).cloned().unwrap_or_default(),
                revenue: MonthlyTotals::from_rows(rows).total_revenue(),
            })
            .collect())
    }

    /// Month-to-date revenue per member, largest first.
    pub async fn member_revenue(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MemberRevenue>, DbErr> {
        let mut list: Vec<MemberRevenue> = self
            .member_revenue_between(start, end)
            .await?
            .into_iter()
            .map(|m| MemberRevenue {
                user_name: m.user_name,
                revenue: m.revenue,
            })
            .collect();
        list.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.user_name.cmp(&b.user_name))
        });
        Ok(list)
    }

    /// `UserInvoice.revenue` per member for a settled month.
    pub async fn settled_member_revenue(
        &self,
        period: Period,
    ) -> Result<Vec<MemberShareInput>, DbErr> {
        let (year, month) = period_key(period);
        let rows: Vec<(i64, i64)> = user_invoices::Entity::find()
            .filter(user_invoices::Column::Year.eq(year))
            .filter(user_invoices::Column::Month.eq(month))
            .select_only()
            .column(user_invoices::Column::UserId)
            .column(user_invoices::Column::Revenue)
            .into_tuple()
            .all(&self.db)
            .await?;

        let names = self.user_names(rows.iter().map(|(id, _)| *id).collect()).await?;
        Ok(rows
            .into_iter()
            .map(|(user_id, revenue)| MemberShareInput {
                user_id,
                user_name: names.get(&user_id).cloned().unwrap_or_default(),
                revenue,
            })
            .collect())
    }

    /// Number of sales per insurance company over `start..=end`.
    pub async fn company_counts_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(String, i64)>, DbErr> {
        let company_ids: Vec<i64> = transactions::Entity::find()
            .filter(transactions::Column::Date.between(start, end))
            .select_only()
            .column(transactions::Column::InsuranceCompanyId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for id in company_ids {
            *counts.entry(id).or_default() += 1;
        }

        let names: HashMap<i64, String> = insurance_companies::Entity::find()
            .filter(insurance_companies::Column::Id.is_in(counts.keys().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(counts
            .into_iter()
            .filter_map(|(id, count)| names.get(&id).map(|name| (name.clone(), count)))
            .collect())
    }

    /// Σ `UserInvoice.revenue` per settled month in `from..=to`.
    pub async fn settled_revenue_history(
        &self,
        from: Period,
        to: Period,
    ) -> Result<Vec<MonthlyRevenue>, DbErr> {
        let (from_year, from_month) = period_key(from);
        let (to_year, to_month) = period_key(to);
        let after_start = Condition::any()
            .add(user_invoices::Column::Year.gt(from_year))
            .add(
                Condition::all()
                    .add(user_invoices::Column::Year.eq(from_year))
                    .add(user_invoices::Column::Month.gte(from_month)),
            );
        let before_end = Condition::any()
            .add(user_invoices::Column::Year.lt(to_year))
            .add(
                Condition::all()
                    .add(user_invoices::Column::Year.eq(to_year))
                    .add(user_invoices::Column::Month.lte(to_month)),
            );

        let rows: Vec<(i32, i32, i64)> = user_invoices::Entity::find()
            .filter(after_start)
            .filter(before_end)
            .select_only()
            .column(user_invoices::Column::Year)
            .column(user_invoices::Column::Month)
            .column(user_invoices::Column::Revenue)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut months: BTreeMap<(i32, i32), i64> = BTreeMap::new();
        for (year, month, revenue) in rows {
            *months.entry((year, month)).or_default() += revenue;
        }

        Ok(months
            .into_iter()
            .filter_map(|((year, month), revenue)| {
                period_from_key(year, month).map(|p| MonthlyRevenue {
                    year: p.year,
                    month: p.month,
                    revenue,
                })
            })
            .collect())
    }

    async fn user_names(&self, ids: Vec<i64>) -> Result<HashMap<i64, String>, DbErr> {
        Ok(users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect())
    }
}
