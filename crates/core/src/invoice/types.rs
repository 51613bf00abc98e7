//! Invoice inputs and summaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bonus or deduction line added to a monthly invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraLine {
    /// Label shown on the invoice.
    pub name: String,
    /// Signed amount in won.
    pub price: i64,
}

impl ExtraLine {
    /// Creates an extra line.
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Fee terms of a member, taken from the user row at calculation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberFees {
    /// Fixed monthly plate fee in won.
    pub plate_fee: i64,
    /// Contract fee as a percentage of total revenue.
    pub contract_fee: Decimal,
}

/// Transaction totals of one member (or the whole company) for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Every transaction dated in the month.
    pub transaction_count: i64,
    /// Canceled transactions dated in the month.
    pub canceled_transaction_count: i64,
    /// Sum of prices of transactions that were not canceled.
    pub revenue: i64,
    /// Sum of cancellation fees of canceled transactions.
    pub cancel_fee: i64,
}

impl MonthlyTotals {
    /// Folds `(price, cancel_fee, canceled)` rows into totals.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64, bool)>,
    {
        rows.into_iter()
            .fold(Self::default(), |mut acc, (price, cancel_fee, canceled)| {
                acc.transaction_count += 1;
                if canceled {
                    acc.canceled_transaction_count += 1;
                    acc.cancel_fee += cancel_fee;
                } else {
                    acc.revenue += price;
                }
                acc
            })
    }

    /// Revenue plus cancellation fees.
    #[must_use]
    pub const fn total_revenue(&self) -> i64 {
        self.revenue + self.cancel_fee
    }
}

/// Monthly payroll summary of one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInvoiceSummary {
    /// Member the invoice is for.
    pub user_id: i64,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Contract fee percentage applied.
    #[serde(with = "rust_decimal::serde::float")]
    pub contract_fee: Decimal,
    /// Plate fee deducted from the first income.
    pub plate_fee: i64,
    /// Transactions dated in the month.
    pub transaction_count: i64,
    /// Canceled transactions dated in the month.
    pub canceled_transaction_count: i64,
    /// Prices of transactions that were not canceled.
    pub revenue: i64,
    /// Cancellation fees of canceled transactions.
    pub cancel_fee: i64,
    /// `revenue + cancel_fee`.
    pub total_revenue: i64,
    /// Contract fee share of `total_revenue`, truncated.
    pub total_contract_fee: i64,
    /// VAT on the revenue left after the contract fee.
    pub first_vat: i64,
    /// Income before extras.
    pub first_income: i64,
    /// Bonus and deduction lines.
    pub extra: Vec<ExtraLine>,
    /// VAT on the first income plus extras; zero without extras.
    pub second_vat: i64,
    /// Income after extras; zero without extras.
    pub second_income: i64,
    /// Final amount paid to the member.
    pub income: i64,
}

/// Company-wide figures feeding the company invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyTotals {
    /// Revenue of every member for the month, cancellation fees included.
    pub revenue: i64,
    /// Sum of plate fees on the month's user invoices.
    pub plate_fee: i64,
    /// Sum of incomes on the month's user invoices.
    pub employee_salary: i64,
}

/// Monthly summary of the company.
///
/// `rental_fee`, `maintenance_fee` and `income` are only present once both
/// fees are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInvoiceSummary {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Member revenue including cancellation fees.
    pub revenue: i64,
    /// Plate fees collected from members.
    pub plate_fee: i64,
    /// Incomes paid to members.
    pub employee_salary: i64,
    /// Bonus and deduction lines.
    pub extra: Vec<ExtraLine>,
    /// Office rent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_fee: Option<i64>,
    /// Office upkeep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_fee: Option<i64>,
    /// Company profit for the month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<i64>,
}
