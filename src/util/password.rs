//! Password hashing and verification utilities
//!
//! Argon2id hashing for stored credentials plus the strength rules applied
//! when a user picks a password.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

pub trait PasswordUtils {
    /// Hashes the given password using Argon2id algorithm
    fn hash_password(password: &str) -> Result<String, PasswordError>;

    /// Verifies the given password against the stored hash
    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError>;

    /// Validates the strength of the given password
    fn validate_password_strength(password: &str) -> Result<(), Vec<String>>;
}

const MIN_PASSWORD_LENGTH: usize = 8;
const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub struct PasswordUtilsImpl;

impl PasswordUtils for PasswordUtilsImpl {
    fn hash_password(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| {
                error!("Failed to hash password: {}", err);
                PasswordError::HashingFailed(err.to_string())
            })
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|err| {
            error!("Invalid password hash format: {}", err);
            PasswordError::InvalidHashFormat
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed - invalid password");
                Ok(false)
            }
            Err(err) => {
                error!("Password verification error: {}", err);
                Err(PasswordError::VerificationFailed(err.to_string()))
            }
        }
    }

    fn validate_password_strength(password: &str) -> Result<(), Vec<String>> {
        let rules: [(fn(char) -> bool, &str); 4] = [
            (char::is_uppercase, "at least one uppercase letter"),
            (char::is_lowercase, "at least one lowercase letter"),
            (|c| c.is_ascii_digit(), "at least one digit"),
            (|c| SPECIAL_CHARACTERS.contains(c), "at least one special character"),
        ];

        let mut errors = Vec::new();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!("Password must be at least {} characters long", MIN_PASSWORD_LENGTH));
        }
        for (accepts, requirement) in rules {
            if !password.chars().any(accepts) {
                errors.push(format!("Password must contain {}", requirement));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordUtilsImpl::hash_password("ValidPass123!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(PasswordUtilsImpl::verify_password("ValidPass123!", &hash).unwrap());
        assert!(!PasswordUtilsImpl::verify_password("WrongPass123!", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = PasswordUtilsImpl::hash_password("ValidPass123!").unwrap();
        let b = PasswordUtilsImpl::hash_password("ValidPass123!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(matches!(
            PasswordUtilsImpl::verify_password("whatever", "not-a-hash"),
            Err(PasswordError::InvalidHashFormat)
        ));
    }

    #[test]
    fn test_password_strength() {
        assert!(PasswordUtilsImpl::validate_password_strength("ComplexP@ssw0rd2024").is_ok());
        let errors = PasswordUtilsImpl::validate_password_strength("weak").unwrap_err();
        assert!(errors.len() >= 3);
        assert!(PasswordUtilsImpl::validate_password_strength("NoSpecialChars123").is_err());
    }
}
