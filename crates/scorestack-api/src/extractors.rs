//! Custom axum extractors
//!
//! Request extractors for authentication, pagination, and validation. The
//! guard middleware stores the verified identity in request extensions;
//! these extractors pull it out and enforce per-route requirements.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ApiError, ErrorResponse};

pub use scorestack_auth::types::Role;

// =============================================================================
// Authenticated user extractor
// =============================================================================

/// Authenticated user information extracted from the request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID
    pub user_id: Uuid,
    /// Username
    pub username: String,
    /// User email
    pub email: String,
    /// Roles at token-issue time
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Convert back to the auth-layer identity for service calls
    pub fn as_auth(&self) -> scorestack_auth::types::AuthenticatedUser {
        scorestack_auth::types::AuthenticatedUser {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
        }
    }
}

fn from_auth(u: scorestack_auth::types::AuthenticatedUser) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: u.user_id,
        username: u.username,
        email: u.email,
        roles: u.roles,
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<scorestack_auth::types::AuthenticatedUser>()
            .cloned()
            .map(from_auth)
            .ok_or_else(|| error_response(ApiError::Unauthenticated))
    }
}

// =============================================================================
// Admin required extractor
// =============================================================================

/// Extractor that requires the admin role
pub struct RequireAdmin(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<scorestack_auth::types::AuthenticatedUser>()
            .cloned()
            .map(from_auth)
            .ok_or_else(|| error_response(ApiError::Unauthenticated))?;

        if !user.is_admin() {
            return Err(error_response(ApiError::Forbidden));
        }

        Ok(RequireAdmin(user))
    }
}

// =============================================================================
// Validated JSON extractor
// =============================================================================

/// JSON extractor with validation
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + validator::Validate,
{
    type Rejection = Response;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.to_string())))?;

        value
            .validate()
            .map_err(|e| error_response(ApiError::from(e)))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Client IP extractor
// =============================================================================

/// Extract the client IP from proxy headers
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let ip = headers
            .get("CF-Connecting-IP")
            .or_else(|| headers.get("X-Real-IP"))
            .or_else(|| headers.get("X-Forwarded-For"))
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(',').next().unwrap_or(s).trim().to_string());

        Ok(ClientIp(ip))
    }
}

// =============================================================================
// Pagination extractor
// =============================================================================

/// Pagination parameters
#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl PaginationParams {
    /// Offset for the database query. Computed in i64 so a huge page number
    /// cannot overflow u32 arithmetic.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).max(0) * i64::from(self.limit)
    }

    /// Limit clamped to a maximum
    pub fn limit(&self, max: u32) -> i64 {
        self.limit.min(max) as i64
    }
}

/// Pagination extractor
pub struct Pagination(pub PaginationParams);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.to_string())))?;

        if params.page == 0 {
            return Err(error_response(ApiError::BadRequest(
                "Page must be >= 1".to_string(),
            )));
        }
        if params.limit == 0 || params.limit > 1000 {
            return Err(error_response(ApiError::BadRequest(
                "Limit must be between 1 and 1000".to_string(),
            )));
        }

        Ok(Pagination(params))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Create an error response from an ApiError
pub fn error_response(error: ApiError) -> Response {
    let status = error.status_code();
    let body = ErrorResponse::from(&error);
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let params = PaginationParams { page: 1, limit: 50 };
        assert_eq!(params.offset(), 0);

        let params = PaginationParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_pagination_offset_huge_page_does_not_overflow() {
        let params = PaginationParams {
            page: u32::MAX,
            limit: 1000,
        };
        assert_eq!(params.offset(), (i64::from(u32::MAX) - 1) * 1000);

        let params = PaginationParams { page: 0, limit: 50 };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_limit_clamped() {
        let params = PaginationParams {
            page: 1,
            limit: 500,
        };
        assert_eq!(params.limit(100), 100);

        let params = PaginationParams { page: 1, limit: 50 };
        assert_eq!(params.limit(100), 50);
    }

    #[test]
    fn test_is_admin() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            roles: vec![Role::Member, Role::Admin],
        };
        assert!(user.is_admin());
    }
}
