//! Monthly member payroll and company invoice engine.

pub mod error;
pub mod service;
pub mod types;


pub use error::InvoiceError;
pub use service::{InvoiceService, VAT_RATE};
pub use types::{
    CompanyInvoiceSummary, CompanyTotals, ExtraLine, MemberFees, MonthlyTotals, UserInvoiceSummary,
};
