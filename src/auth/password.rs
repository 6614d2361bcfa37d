//! Password hashing (argon2)

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Check a password against a stored PHC hash string.
///
/// A mismatch is `Ok(false)`; only an unparseable hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Stand-in hash verified when no account exists, built with the same
/// parameters as real hashes.
static UNKNOWN_ACCOUNT_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("unknown-account").ok());

/// Verify against `hash`, or spend the same argon2 work on a stand-in hash
/// when the account does not exist. Without a hash the result is always
/// `Ok(false)`.
pub fn verify_password_or_dummy(password: &str, hash: Option<&str>) -> Result<bool, PasswordError> {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = UNKNOWN_ACCOUNT_HASH.as_deref() {
                verify_password(password, dummy)?;
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_hashes_differently_but_verifies() {
        let first = hash_password("secret123").unwrap();
        let second = hash_password("secret123").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("secret123", &first).unwrap());
        assert!(verify_password("secret123", &second).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("secret123").unwrap();
        assert_eq!(verify_password("secret124", &hash), Ok(false));
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("plaintext-password").unwrap();
        assert!(!hash.contains("plaintext-password"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn missing_account_never_verifies() {
        assert_eq!(verify_password_or_dummy("unknown-account", None), Ok(false));
        assert_eq!(verify_password_or_dummy("secret123", None), Ok(false));
    }

    #[test]
    fn stand_in_hash_uses_real_hash_parameters() {
        let dummy = UNKNOWN_ACCOUNT_HASH.as_deref().unwrap();
        let real = hash_password("secret123").unwrap();

        let dummy = PasswordHash::new(dummy).unwrap();
        let real = PasswordHash::new(&real).unwrap();
        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params, real.params);
    }

    #[test]
    fn present_hash_is_checked_normally() {
        let hash = hash_password("secret123").unwrap();
        assert_eq!(verify_password_or_dummy("secret123", Some(&hash)), Ok(true));
        assert_eq!(verify_password_or_dummy("secret124", Some(&hash)), Ok(false));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert_eq!(
            verify_password("secret123", "not-a-hash"),
            Err(PasswordError::InvalidHashFormat)
        );
    }
}
