//! `SeaORM` entity definitions.

pub mod prelude;

pub mod company_invoice_extras;
pub mod company_invoices;
pub mod insurance_companies;
pub mod permissions;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod user_invoice_extras;
pub mod user_invoices;
pub mod user_roles;
pub mod users;
