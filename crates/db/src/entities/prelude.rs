//! Entity re-exports.

pub use super::company_invoice_extras::Entity as CompanyInvoiceExtras;
pub use super::company_invoices::Entity as CompanyInvoices;
pub use super::insurance_companies::Entity as InsuranceCompanies;
pub use super::permissions::Entity as Permissions;
pub use super::transactions::Entity as Transactions;
pub use super::user_invoice_extras::Entity as UserInvoiceExtras;
pub use super::user_invoices::Entity as UserInvoices;
pub use super::user_roles::Entity as UserRoles;
pub use super::users::Entity as Users;
