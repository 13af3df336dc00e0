//! Password hashing with Argon2id.
//!
//! Uses the recommended Argon2id variant with secure defaults.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during password operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password has no uppercase letter.
    #[error("password must contain an uppercase letter")]
    MissingUppercase,

    /// Password has no lowercase letter.
    #[error("password must contain a lowercase letter")]
    MissingLowercase,

    /// Password has no digit.
    #[error("password must contain a digit")]
    MissingDigit,
}

/// Checks a signup password against the strength rules.
///
/// Rules are checked in order: length, uppercase, lowercase, digit. The
/// first failing rule is reported.
///
/// # Errors
///
/// Returns the [`PasswordError`] variant of the first rule not met.
///
/// # Example
///
/// ```
/// use tanzia_core::auth::{PasswordError, validate_password_strength};
///
/// assert!(validate_password_strength("Syndic2025").is_ok());
/// assert_eq!(validate_password_strength("short"), Err(PasswordError::TooShort));
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(PasswordError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    Ok(())
}

/// Hashes a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use tanzia_core::auth::hash_password;
///
/// let hash = hash_password("Copropriete1").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// Returns `Ok(false)` on a plain mismatch.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the hash format is invalid.
/// Returns `PasswordError::VerifyError` if verification fails unexpectedly.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("Correct1horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Correct1horse", &hash).unwrap());
        assert!(!verify_password("Wrong1horse", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hash1 = hash_password("Password1").unwrap();
        let hash2 = hash_password("Password1").unwrap();

        // random salt
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "invalid_hash");
        assert_eq!(result, Err(PasswordError::InvalidHash));
    }

    #[rstest]
    #[case("Abcdefg1", Ok(()))]
    #[case("Syndic2025", Ok(()))]
    #[case("Ab1", Err(PasswordError::TooShort))]
    #[case("abcdefg1", Err(PasswordError::MissingUppercase))]
    #[case("ABCDEFG1", Err(PasswordError::MissingLowercase))]
    #[case("Abcdefgh", Err(PasswordError::MissingDigit))]
    #[case("Étagère12", Ok(()))]
    fn test_password_strength(#[case] password: &str, #[case] expected: Result<(), PasswordError>) {
        assert_eq!(validate_password_strength(password), expected);
    }
}
