//! Account handlers

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::dto::{ProfileResponse, UpdateCredentialsRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthenticatedUser, ValidatedJson};
use crate::state::AppState;

/// Get own profile
#[utoipa::path(
    get,
    path = "/api/v1/account",
    tag = "Account",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<ProfileResponse>> {
    // Read from the database rather than the token so role changes since
    // token issue are visible here.
    let record = state
        .db
        .user_repo()
        .find_by_id(user.user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        id: record.id.to_string(),
        username: record.username,
        email: record.email,
        roles: record.roles,
    }))
}

/// Update own email and/or password
#[utoipa::path(
    put,
    path = "/api/v1/account/credentials",
    tag = "Account",
    request_body = UpdateCredentialsRequest,
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Credentials updated"),
        (status = 400, description = "Weak password or invalid email"),
        (status = 401, description = "Current password wrong")
    )
)]
pub async fn update_credentials(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateCredentialsRequest>,
) -> ApiResult<StatusCode> {
    if request.email.is_none() && request.new_password.is_none() {
        return Err(ApiError::BadRequest(
            "Nothing to update: provide email or new_password".to_string(),
        ));
    }

    state
        .auth
        .sessions
        .update_credentials(
            &user.as_auth(),
            request.current_password.as_deref(),
            request.email.as_deref(),
            request.new_password.as_deref(),
        )
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %user.user_id, "Credentials updated");

    Ok(StatusCode::NO_CONTENT)
}
