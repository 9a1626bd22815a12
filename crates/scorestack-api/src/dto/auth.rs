//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// =============================================================================
// Login
// =============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token response, returned by both login and refresh. Field names go over
/// the wire as-is, matching the snake_case request bodies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Opaque refresh token
    pub refresh_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token lifetime remaining (seconds)
    pub expires_in: i64,
}

// =============================================================================
// Token refresh and revocation
// =============================================================================

/// Refresh token request. The refresh token travels in the body, never in
/// a header.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    /// Refresh token to exchange
    pub refresh_token: String,
}

/// Revoke token request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RevokeTokenRequest {
    /// Refresh token to revoke
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_wire_format_is_snake_case() {
        let response = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("access_token").is_some());
        assert!(json.get("refresh_token").is_some());
        assert!(json.get("expires_in").is_some());
        assert!(json.get("accessToken").is_none());
    }
}
