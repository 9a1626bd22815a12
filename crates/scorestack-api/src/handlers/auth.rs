//! Authentication handlers
//!
//! Login, token refresh, and token revocation. All denial paths return the
//! same 401 body; the distinction lives only in the audit trail.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::dto::{LoginRequest, RefreshTokenRequest, RevokeTokenRequest, TokenResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthenticatedUser, ClientIp, ValidatedJson};
use crate::state::AppState;

fn token_response(pair: scorestack_auth::types::TokenPair) -> TokenResponse {
    let now = chrono::Utc::now().timestamp();
    TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: pair.token_type,
        expires_in: (pair.access_expires_at - now).max(0),
    }
}

/// User login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let (user, pair) = state
        .auth
        .sessions
        .login(&request.username, &request.password, ip.as_deref())
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(Json(token_response(pair)))
}

/// Refresh access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Authentication",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Json(request): Json<RefreshTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let (_user, pair) = state
        .auth
        .sessions
        .refresh(&request.refresh_token, ip.as_deref())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(token_response(pair)))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/v1/auth/revoke",
    tag = "Authentication",
    request_body = RevokeTokenRequest,
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the token owner"),
        (status = 404, description = "Token not found")
    )
)]
pub async fn revoke_token(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<RevokeTokenRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .sessions
        .revoke(&request.refresh_token, &user.as_auth())
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %user.user_id, "Refresh token revoked");

    Ok(StatusCode::NO_CONTENT)
}
