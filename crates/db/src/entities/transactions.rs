//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub insurance_company_id: i64,
    pub vehicle_id: String,
    pub vehicle_model: String,
    pub date: Date,
    pub price: i64,
    pub memo: String,
    pub canceled: bool,
    pub cancel_fee: i64,
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
    #[sea_orm(
        belongs_to = "super::insurance_companies::Entity",
        from = "Column::InsuranceCompanyId",
        to = "super::insurance_companies::Column::Id"
    )]
    InsuranceCompanies,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::insurance_companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InsuranceCompanies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
