//! Invoice error types.

use brokerdesk_shared::AppError;
use thiserror::Error;

use crate::period::Period;

/// Invoice-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    /// A snapshot already exists for the period.
    #[error("The invoice for {0} is already settled")]
    AlreadySettled(Period),

    /// Some members still have no snapshot for the period.
    #[error("{0} member invoice(s) for this month are not settled yet")]
    MembersNotSettled(usize),

    /// Contract fee outside 0-100 percent.
    #[error("Contract fee must be between 0 and 100")]
    InvalidContractFee,

    /// Negative plate fee.
    #[error("Plate fee cannot be negative")]
    NegativePlateFee,

    /// A computed amount does not fit in a won column.
    #[error("Invoice amount is out of range")]
    Overflow,
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::AlreadySettled(_) => Self::BusinessRule(err.to_string()),
            InvoiceError::MembersNotSettled(_) => Self::Forbidden(err.to_string()),
            InvoiceError::InvalidContractFee
            | InvoiceError::NegativePlateFee
            | InvoiceError::Overflow => Self::Validation(err.to_string()),
        }
    }
}
