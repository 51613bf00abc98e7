//! Password hashing with bcrypt.

use thiserror::Error;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Invalid password hash format.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Work factor used for new hashes.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashes a password using bcrypt with [`DEFAULT_COST`].
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use brokerdesk_core::auth::hash_password;
///
/// let hash = hash_password("secret12!").unwrap();
/// assert!(hash.starts_with("$2"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hashes a password with an explicit bcrypt cost.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the cost is out of range or hashing fails.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(|_| PasswordError::InvalidHash)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts; keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_password() {
        let password = "test_password_123!";
        let hash = hash_password_with_cost(password, TEST_COST).unwrap();

        assert!(hash.starts_with("$2b$04$"));
        assert_ne!(hash, password);
    }

    #[test]
    fn test_verify_correct_password() {
        let hash = hash_password_with_cost("correct1!", TEST_COST).unwrap();
        assert!(verify_password("correct1!", &hash).unwrap());
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password_with_cost("correct1!", TEST_COST).unwrap();
        assert!(!verify_password("wrong1!", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password_with_cost("password1!", TEST_COST).unwrap();
        let hash2 = hash_password_with_cost("password1!", TEST_COST).unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_cost_out_of_range() {
        assert!(matches!(
            hash_password_with_cost("password1!", 2),
            Err(PasswordError::HashError(_))
        ));
    }
}
