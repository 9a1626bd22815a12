//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Any authentication denial. Deliberately carries no detail about
    /// whether the user exists, is disabled, or typed the wrong password.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error")]
    Internal(String),

    #[error("Database error")]
    DatabaseError,
}

impl ApiError {
    /// Machine-readable error code for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Internal(_) | Self::DatabaseError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client
    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::DatabaseError => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.client_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, ApiError::Internal(_)) {
            tracing::error!(error = %self, "Internal API error");
        }
        let status = self.status_code();
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

impl From<scorestack_auth::AuthError> for ApiError {
    fn from(err: scorestack_auth::AuthError) -> Self {
        use scorestack_auth::AuthError;
        match err {
            AuthError::Unauthenticated => Self::Unauthenticated,
            AuthError::Forbidden => Self::Forbidden,
            AuthError::NotFound(msg) => Self::NotFound(msg),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => {
                tracing::error!(error = %msg, "Database error behind auth operation");
                Self::DatabaseError
            }
            AuthError::Config(msg) | AuthError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<scorestack_db::DbError> for ApiError {
    fn from(err: scorestack_db::DbError) -> Self {
        match err {
            scorestack_db::DbError::NotFound(msg) => Self::NotFound(msg),
            scorestack_db::DbError::Duplicate(msg) => Self::Conflict(msg),
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::DatabaseError
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        Self::BadRequest("Invalid request body".to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message.as_ref().map(|m| m.as_ref()).unwrap_or("invalid")
                    )
                })
            })
            .collect();
        Self::ValidationError(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ValidationError("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err = ApiError::Internal("secret connection string".to_string());
        let body = ErrorResponse::from(&err);
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: ApiError = scorestack_auth::AuthError::Unauthenticated.into();
        assert!(matches!(err, ApiError::Unauthenticated));

        let err: ApiError = scorestack_auth::AuthError::Validation("bad role".to_string()).into();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
