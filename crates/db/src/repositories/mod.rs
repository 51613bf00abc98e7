//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod dashboard;
pub mod insurance_company;
pub mod invoice;
pub mod permission;
pub mod role;
pub mod transaction;
pub mod user;

pub use dashboard::DashboardRepository;
pub use insurance_company::{CompanyError, InsuranceCompanyRepository};
pub use invoice::{ExtraItem, InvoiceRepoError, InvoiceRepository, MonthlyFigures};
pub use permission::PermissionRepository;
pub use role::{RoleError, RoleRepository};
pub use transaction::{
    CanceledFilter, NewTransaction, OrderDirection, TransactionError, TransactionFilter,
    TransactionOrder, TransactionPage, TransactionRepository, TransactionRow, TransactionUpdate,
};
pub use user::{MemberUpdate, MemberView, Removal, UserError, UserRepository};

use brokerdesk_core::Period;

/// `(year, month)` as stored in the invoice tables.
pub(crate) fn period_key(period: Period) -> (i32, i32) {
    (period.year, i32::try_from(period.month).unwrap_or_default())
}

/// Inverse of [`period_key`] for rows read back from the invoice tables.
pub(crate) fn period_from_key(year: i32, month: i32) -> Option<Period> {
    u32::try_from(month)
        .ok()
        .and_then(|month| Period::new(year, month).ok())
}
