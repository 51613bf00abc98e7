//! Input rules for e-mail addresses, names, passwords, vehicles, memos and dates.
//!
//! Lengths are counted in characters so Hangul names get the same limits as
//! Latin ones.

mod rules;

#[cfg(test)]
mod tests;

pub use rules::{
    SPECIAL_CHARACTERS, parse_date, validate_company_name, validate_email, validate_extra_name,
    validate_memo, validate_password, validate_person_name, validate_role_name,
    validate_vehicle_id, validate_vehicle_model,
};

use brokerdesk_shared::AppError;
use thiserror::Error;

/// A rejected input value. The message is shown to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value length out of bounds.
    #[error("{field} must be {min} to {max} characters long")]
    Length {
        /// Human name of the field.
        field: &'static str,
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },

    /// Value contains a space.
    #[error("{field} must not contain spaces")]
    ContainsSpace {
        /// Human name of the field.
        field: &'static str,
    },

    /// Value contains one of [`SPECIAL_CHARACTERS`].
    #[error("{field} must not contain special characters (`~!@#$%^&*.?)")]
    ContainsSpecial {
        /// Human name of the field.
        field: &'static str,
    },

    /// Value contains a Latin letter.
    #[error("{field} must not contain Latin letters")]
    ContainsLetter {
        /// Human name of the field.
        field: &'static str,
    },

    /// Malformed e-mail address.
    #[error("Please enter a valid e-mail address")]
    Email,

    /// Password lacks a required character class.
    #[error("Password must contain at least one {0}")]
    PasswordMissing(&'static str),

    /// Date not in `YYYY-MM-DD` form or not a real day.
    #[error("Date must be a valid YYYY-MM-DD date")]
    Date,

    /// Year/month pair that is not a calendar month.
    #[error("Year and month do not form a valid date")]
    Period,

    /// Any other rule.
    #[error("{0}")]
    Other(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
