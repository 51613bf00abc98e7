use chrono::NaiveDate;
use validator::ValidateEmail;

use super::ValidationError;

/// Characters rejected in names and required (one of) in passwords.
pub const SPECIAL_CHARACTERS: &str = "`~!@#$%^&*.?";

fn is_special(c: char) -> bool {
    SPECIAL_CHARACTERS.contains(c)
}

fn check_length(
    value: &str,
    field: &'static str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::Length { field, min, max })
    }
}

fn check_no_space(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.contains(' ') {
        return Err(ValidationError::ContainsSpace { field });
    }
    Ok(())
}

fn check_no_special(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.chars().any(is_special) {
        return Err(ValidationError::ContainsSpecial { field });
    }
    Ok(())
}

/// A label: 2-10 characters, no spaces, no special characters.
fn validate_label(value: &str, field: &'static str) -> Result<(), ValidationError> {
    check_length(value, field, 2, 10)?;
    check_no_space(value, field)?;
    check_no_special(value, field)
}

/// Login e-mail address, at most 255 bytes.
///
/// # Errors
///
/// Returns `ValidationError::Email` when the address is malformed or too long.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > 255 || !email.validate_email() {
        return Err(ValidationError::Email);
    }
    Ok(())
}

/// 8-20 characters with at least one digit, one Latin letter, and one special character.
///
/// # Errors
///
/// Returns the first rule the password breaks.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    check_length(password, "Password", 8, 20)?;
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissing("digit"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::PasswordMissing("letter"));
    }
    if !password.chars().any(is_special) {
        return Err(ValidationError::PasswordMissing(
            "special character (`~!@#$%^&*.?)",
        ));
    }
    Ok(())
}

/// Display name of a user.
///
/// # Errors
///
/// Returns the first rule the name breaks.
pub fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    validate_label(name, "Name")
}

/// Name of a user role.
///
/// # Errors
///
/// Returns the first rule the name breaks.
pub fn validate_role_name(name: &str) -> Result<(), ValidationError> {
    validate_label(name, "Role name")
}

/// Name of an insurance company.
///
/// # Errors
///
/// Returns the first rule the name breaks.
pub fn validate_company_name(name: &str) -> Result<(), ValidationError> {
    validate_label(name, "Company name")
}

/// Plate number: 4-10 characters, no special characters, no Latin letters.
///
/// # Errors
///
/// Returns the first rule the plate number breaks.
pub fn validate_vehicle_id(vehicle_id: &str) -> Result<(), ValidationError> {
    let field = "Vehicle number";
    check_length(vehicle_id, field, 4, 10)?;
    check_no_special(vehicle_id, field)?;
    if vehicle_id.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::ContainsLetter { field });
    }
    Ok(())
}

/// Vehicle model: 2-10 characters, no special characters.
///
/// # Errors
///
/// Returns the first rule the model breaks.
pub fn validate_vehicle_model(model: &str) -> Result<(), ValidationError> {
    let field = "Vehicle model";
    check_length(model, field, 2, 10)?;
    check_no_special(model, field)
}

/// Transaction memo: 2-10 characters.
///
/// # Errors
///
/// Returns an error when the memo is too short or too long.
pub fn validate_memo(memo: &str) -> Result<(), ValidationError> {
    check_length(memo, "Memo", 2, 10)
}

/// Invoice extra label: 2-15 characters.
///
/// # Errors
///
/// Returns an error when the name is too short or too long.
pub fn validate_extra_name(name: &str) -> Result<(), ValidationError> {
    check_length(name, "Extra name", 2, 15)
}

/// Parses a strict `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `ValidationError::Date` for any other format or an impossible day.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::Date)
}
