//! Authentication error types
//!
//! The caller-visible taxonomy is deliberately narrow. Every reason an
//! authentication attempt can be denied (unknown user, wrong password,
//! disabled account, invalid/expired/revoked refresh token) collapses into a
//! single `Unauthenticated` variant so the response leaks nothing about which
//! reason applied; the audit trail privately records the specifics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad or missing credentials, invalid/expired/revoked refresh token, or
    /// a disabled account at login or refresh. One uniform client response.
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated but not allowed: role-insufficient action, or revoking
    /// someone else's token without admin rights.
    #[error("Insufficient permissions")]
    Forbidden,

    /// Unknown target user or unknown refresh token on explicit revoke.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input: unknown role name, weak password, self-targeting
    /// guardrails, duplicate role grant or absent role removal.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error (startup-fatal)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Config(_) => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error response for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub code: String,
    /// Error message (human-readable)
    pub message: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.client_message(),
        }
    }
}

// Implement conversion from common error types
impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        // Expired, malformed, and bad-signature tokens are all the same to
        // the caller.
        Self::Unauthenticated
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(_: argon2::password_hash::Error) -> Self {
        Self::Unauthenticated
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<scorestack_db::DbError> for AuthError {
    fn from(err: scorestack_db::DbError) -> Self {
        match err {
            scorestack_db::DbError::NotFound(msg) => Self::NotFound(msg),
            scorestack_db::DbError::Duplicate(msg) => Self::Validation(msg),
            other => Self::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Unauthenticated.status_code(), 401);
        assert_eq!(AuthError::Forbidden.status_code(), 403);
        assert_eq!(AuthError::NotFound("user".to_string()).status_code(), 404);
        assert_eq!(AuthError::Validation("role".to_string()).status_code(), 400);
        assert_eq!(AuthError::Database("x".to_string()).status_code(), 500);
    }

    #[test]
    fn test_client_message_hides_internal_details() {
        let err = AuthError::Database("connection string with password".to_string());
        assert!(!err.client_message().contains("password"));
        assert_eq!(err.client_message(), "An internal error occurred");
    }

    #[test]
    fn test_jwt_errors_collapse_to_unauthenticated() {
        let err = jsonwebtoken::decode::<serde_json::Value>(
            "not-a-token",
            &jsonwebtoken::DecodingKey::from_secret(b"k"),
            &jsonwebtoken::Validation::default(),
        )
        .unwrap_err();
        assert!(matches!(AuthError::from(err), AuthError::Unauthenticated));
    }
}
