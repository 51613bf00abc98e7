//! Dashboard data types.

use serde::{Deserialize, Serialize};

/// Revenue of the current range against the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueComparison {
    /// Revenue of the current range.
    pub revenue: i64,
    /// Whole-percent change from the previous range.
    pub difference_percentage: i64,
}

/// Transaction count of the current range against the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountComparison {
    /// Transactions in the current range.
    pub transaction_count: i64,
    /// Current count minus previous count.
    pub difference_count: i64,
}

/// Revenue of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Revenue including cancellation fees.
    pub revenue: i64,
}

/// Month-to-date revenue of one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRevenue {
    /// Display name.
    pub user_name: String,
    /// Revenue including cancellation fees.
    pub revenue: i64,
}

/// A member's share of the company revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRevenueRate {
    /// Display name.
    pub user_name: String,
    /// Share of this month's revenue in whole percent.
    pub percentage: i64,
    /// Change in share points from last month.
    pub difference_percentage: i64,
}

/// An insurance company's share of the transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRate {
    /// Insurance company name.
    pub company_name: String,
    /// Share of this month's transactions in whole percent.
    pub percentage: i64,
    /// Change in share points from last month.
    pub difference_percentage: i64,
}

/// Revenue attributed to one member for some month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberShareInput {
    /// Member id, the key for matching months.
    pub user_id: i64,
    /// Display name.
    pub user_name: String,
    /// Revenue in won.
    pub revenue: i64,
}
