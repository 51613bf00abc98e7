//! Authentication primitives.
//!
//! This module provides:
//! - Password hashing with bcrypt
//! - Password verification

mod password;

pub use password::{
    DEFAULT_COST, PasswordError, hash_password, hash_password_with_cost, verify_password,
};

use brokerdesk_shared::AppError;

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}
