//! `SeaORM` Entity for user_invoices table.
//!
//! One settled payroll snapshot per member and month.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub year: i32,
    pub month: i32,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub contract_fee: Decimal,
    pub plate_fee: i64,
    pub transaction_count: i64,
    pub canceled_transaction_count: i64,
    pub revenue: i64,
    pub cancel_fee: i64,
    pub total_revenue: i64,
    pub total_contract_fee: i64,
    pub first_vat: i64,
    pub first_income: i64,
    pub second_vat: i64,
    pub second_income: i64,
    pub income: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
