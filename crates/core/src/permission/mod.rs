//! Per-domain access levels.
//!
//! Every accepted user holds one level per domain. `SR`/`SRW` restrict the
//! user to their own rows, `AR`/`ARW` open all rows, and the `W` suffix grants
//! writes. The user and invoice domains have no self-write level; the
//! transaction domain has no self-read-only level.

mod level;

#[cfg(test)]
mod tests;

pub use level::{AccessLevel, InvoiceAccess, TransactionAccess, UnknownLevel, UserAccess};

use brokerdesk_shared::AppError;
use serde::{Deserialize, Serialize};

/// The three levels a user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Access to user and role management.
    pub user: UserAccess,
    /// Access to the transaction ledger and insurance companies.
    pub transaction: TransactionAccess,
    /// Access to invoices and extras.
    pub invoice: InvoiceAccess,
}

impl PermissionSet {
    /// Full access on every domain, given to the bootstrap administrator.
    pub const ADMIN: Self = Self {
        user: UserAccess::Arw,
        transaction: TransactionAccess::Arw,
        invoice: InvoiceAccess::Arw,
    };

    /// Defaults for a newly approved user.
    pub const DEFAULT: Self = Self {
        user: UserAccess::Sr,
        transaction: TransactionAccess::Srw,
        invoice: InvoiceAccess::Sr,
    };
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Decides whether an actor may read rows owned by `owner_id`.
#[must_use]
pub fn can_read_row<L: AccessLevel>(level: L, actor_id: i64, owner_id: i64) -> bool {
    level.reads_all() || actor_id == owner_id
}

/// Decides whether an actor may modify rows owned by `owner_id`.
#[must_use]
pub fn can_write_row<L: AccessLevel>(level: L, actor_id: i64, owner_id: i64) -> bool {
    level.writes_all() || (level.writes_own() && actor_id == owner_id)
}

impl From<UnknownLevel> for AppError {
    fn from(err: UnknownLevel) -> Self {
        Self::Validation(err.to_string())
    }
}
