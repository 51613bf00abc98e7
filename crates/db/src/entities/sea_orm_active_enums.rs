//! Postgres enum types and their mapping to the core permission levels.

use brokerdesk_core::permission::{InvoiceAccess, PermissionSet, TransactionAccess, UserAccess};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_status")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Signed up, e-mail not confirmed.
    #[sea_orm(string_value = "registered")]
    Registered,
    /// E-mail confirmed, waiting for approval.
    #[sea_orm(string_value = "verified")]
    Verified,
    /// Approved member.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Withdrawn member.
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_access")]
pub enum UserAccessLevel {
    #[sea_orm(string_value = "SR")]
    #[serde(rename = "SR")]
    Sr,
    #[sea_orm(string_value = "AR")]
    #[serde(rename = "AR")]
    Ar,
    #[sea_orm(string_value = "ARW")]
    #[serde(rename = "ARW")]
    Arw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_access")]
pub enum TransactionAccessLevel {
    #[sea_orm(string_value = "SRW")]
    #[serde(rename = "SRW")]
    Srw,
    #[sea_orm(string_value = "AR")]
    #[serde(rename = "AR")]
    Ar,
    #[sea_orm(string_value = "ARW")]
    #[serde(rename = "ARW")]
    Arw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_access")]
pub enum InvoiceAccessLevel {
    #[sea_orm(string_value = "SR")]
    #[serde(rename = "SR")]
    Sr,
    #[sea_orm(string_value = "AR")]
    #[serde(rename = "AR")]
    Ar,
    #[sea_orm(string_value = "ARW")]
    #[serde(rename = "ARW")]
    Arw,
}

macro_rules! level_conversions {
    ($db:ident <=> $core:ident { $($variant:ident),+ }) => {
        impl From<$db> for $core {
            fn from(level: $db) -> Self {
                match level {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(level: $core) -> Self {
                match level {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

level_conversions!(UserAccessLevel <=> UserAccess { Sr, Ar, Arw });
level_conversions!(TransactionAccessLevel <=> TransactionAccess { Srw, Ar, Arw });
level_conversions!(InvoiceAccessLevel <=> InvoiceAccess { Sr, Ar, Arw });

impl From<&super::permissions::Model> for PermissionSet {
    fn from(row: &super::permissions::Model) -> Self {
        Self {
            user: row.user_level.into(),
            transaction: row.transaction_level.into(),
            invoice: row.invoice_level.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_levels_round_trip_through_core() {
        for level in UserAccessLevel::iter() {
            assert_eq!(UserAccessLevel::from(UserAccess::from(level)), level);
        }
        assert_eq!(
            TransactionAccess::from(TransactionAccessLevel::Srw),
            TransactionAccess::Srw
        );
        assert_eq!(InvoiceAccessLevel::from(InvoiceAccess::Ar), InvoiceAccessLevel::Ar);
    }

    #[test]
    fn test_db_values_match_wire_codes() {
        use brokerdesk_core::permission::AccessLevel;

        for level in TransactionAccessLevel::iter() {
            assert_eq!(level.to_value(), TransactionAccess::from(level).code());
        }
        assert_eq!(UserStatus::Accepted.to_value(), "accepted");
    }
}
