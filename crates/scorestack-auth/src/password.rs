//! Password hashing
//!
//! Argon2id hashing with an optional server-side pepper. Verification is a
//! constant-time comparison inside the argon2 crate.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use zeroize::Zeroizing;

use crate::config::PasswordConfig;
use crate::error::{AuthError, AuthResult};

/// Password service for hashing and verification
#[derive(Clone)]
pub struct PasswordService {
    config: PasswordConfig,
}

impl PasswordService {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    /// Hash a password using Argon2id
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        self.validate_strength(password)?;

        let peppered = self.apply_pepper(password);
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let peppered = self.apply_pepper(password);

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Stored hash is malformed: {}", e)))?;

        match Argon2::default().verify_password(peppered.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }

    /// Validate password strength before accepting a new password
    pub fn validate_strength(&self, password: &str) -> AuthResult<()> {
        if password.len() < self.config.min_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_length
            )));
        }
        if password.len() > 128 {
            return Err(AuthError::Validation(
                "Password must be at most 128 characters".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_alphabetic()) {
            return Err(AuthError::Validation(
                "Password must contain at least one letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::Validation(
                "Password must contain at least one digit".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_pepper(&self, password: &str) -> Zeroizing<String> {
        if self.config.pepper.is_empty() {
            Zeroizing::new(password.to_string())
        } else {
            Zeroizing::new(format!("{}{}", password, self.config.pepper))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PasswordConfig {
        PasswordConfig {
            pepper: String::new(),
            min_length: 12,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new(test_config());
        let password = "correct-horse-battery-7";

        let hash = service.hash_password(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(service.verify_password(password, &hash).unwrap());
        assert!(!service.verify_password("wrong-password-123", &hash).unwrap());
    }

    #[test]
    fn test_hash_with_pepper() {
        let mut config = test_config();
        config.pepper = "secret-pepper".to_string();
        let service = PasswordService::new(config);

        let password = "correct-horse-battery-7";
        let hash = service.hash_password(password).unwrap();

        assert!(service.verify_password(password, &hash).unwrap());

        // A service without the pepper must not verify
        let service_no_pepper = PasswordService::new(test_config());
        assert!(!service_no_pepper.verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_strength_validation() {
        let service = PasswordService::new(test_config());

        assert!(service.validate_strength("long-enough-pass-1").is_ok());
        assert!(service.validate_strength("short1").is_err());
        assert!(service.validate_strength("no-digits-here-at-all").is_err());
        assert!(service.validate_strength("123456789012345678").is_err());
    }

    #[test]
    fn test_different_salts() {
        let service = PasswordService::new(test_config());
        let password = "correct-horse-battery-7";

        let hash1 = service.hash_password(password).unwrap();
        let hash2 = service.hash_password(password).unwrap();
        assert_ne!(hash1, hash2);

        assert!(service.verify_password(password, &hash1).unwrap());
        assert!(service.verify_password(password, &hash2).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_is_internal_error() {
        let service = PasswordService::new(test_config());
        let result = service.verify_password("whatever-pass-1", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
