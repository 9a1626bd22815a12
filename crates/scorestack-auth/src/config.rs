//! Authentication configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Top-level authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT settings
    pub jwt: JwtConfig,
    /// Password hashing settings
    pub password: PasswordConfig,
    /// Refresh token settings
    pub refresh: RefreshConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            password: PasswordConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            password: PasswordConfig::from_env(),
            refresh: RefreshConfig::from_env(),
        }
    }

    /// Validate the configuration. Called at startup; a bad secret must kill
    /// the process rather than mint unverifiable tokens.
    pub fn validate(&self) -> AuthResult<()> {
        self.jwt.validate()?;
        self.password.validate()?;
        self.refresh.validate()?;
        Ok(())
    }
}

/// JWT signing and validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret for HS256 signing
    pub secret: String,
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_lifetime: Duration::from_secs(3600),
            issuer: "scorestack".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.secret = secret;
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.issuer = issuer;
        }
        if let Ok(secs) = std::env::var("JWT_ACCESS_TOKEN_LIFETIME_SECS") {
            if let Ok(secs) = secs.parse() {
                config.access_token_lifetime = Duration::from_secs(secs);
            }
        }
        config
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::Config("JWT secret must not be empty".to_string()));
        }
        if self.secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT secret must be at least 32 bytes".to_string(),
            ));
        }
        if self.access_token_lifetime.as_secs() == 0 {
            return Err(AuthError::Config(
                "Access token lifetime must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Optional server-side pepper mixed into every password before hashing
    pub pepper: String,
    /// Minimum accepted password length
    pub min_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            pepper: String::new(),
            min_length: 12,
        }
    }
}

impl PasswordConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(pepper) = std::env::var("PASSWORD_PEPPER") {
            config.pepper = pepper;
        }
        if let Ok(len) = std::env::var("PASSWORD_MIN_LENGTH") {
            if let Ok(len) = len.parse() {
                config.min_length = len;
            }
        }
        config
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.min_length < 8 {
            return Err(AuthError::Config(
                "Minimum password length must be at least 8".to_string(),
            ));
        }
        Ok(())
    }
}

/// Refresh token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Refresh token time-to-live
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Random bytes per token before base64 encoding
    pub token_bytes: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(7 * 24 * 3600),
            token_bytes: 64,
        }
    }
}

impl RefreshConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(secs) = std::env::var("REFRESH_TOKEN_TTL_SECS") {
            if let Ok(secs) = secs.parse() {
                config.ttl = Duration::from_secs(secs);
            }
        }
        if let Ok(bytes) = std::env::var("REFRESH_TOKEN_BYTES") {
            if let Ok(bytes) = bytes.parse() {
                config.token_bytes = bytes;
            }
        }
        config
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.ttl.as_secs() == 0 {
            return Err(AuthError::Config("Refresh TTL must be positive".to_string()));
        }
        if self.token_bytes < 64 {
            return Err(AuthError::Config(
                "Refresh tokens need at least 64 random bytes".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.refresh.ttl, Duration::from_secs(7 * 24 * 3600));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = JwtConfig::default();
        config.secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = JwtConfig::default();
        config.secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = AuthConfig::default();
        config.jwt.secret = "a".repeat(32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_weak_refresh_settings_rejected() {
        let mut config = RefreshConfig::default();
        config.token_bytes = 8;
        assert!(config.validate().is_err());

        // Anything below the issued 64 bytes is rejected
        let mut config = RefreshConfig::default();
        config.token_bytes = 48;
        assert!(config.validate().is_err());
    }
}
