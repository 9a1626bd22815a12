//! Admin handlers
//!
//! User management, account disable/enable, role management, and the audit
//! trail. Every route requires the admin role.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{AuditEventResponse, CreateUserRequest, GrantRoleRequest, UserResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ClientIp, Pagination, RequireAdmin, ValidatedJson};
use crate::state::AppState;

const MAX_PAGE_SIZE: u32 = 200;

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "Admin",
    request_body = CreateUserRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request or username already taken")
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    // Parse role names up front so an unknown name rejects the whole request
    let roles = request
        .roles
        .iter()
        .map(|name| name.parse())
        .collect::<Result<Vec<scorestack_auth::types::Role>, _>>()
        .map_err(ApiError::from)?;

    let user = state
        .auth
        .sessions
        .register_user(&request.username, &request.email, &request.password, &roles)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(
        admin = %admin.username,
        user_id = %user.id,
        username = %user.username,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-indexed)"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "User list", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin required")
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
    Pagination(params): Pagination,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .db
        .user_repo()
        .list(params.limit(MAX_PAGE_SIZE), params.offset())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Disable an account
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/disable",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Target user ID")),
    responses(
        (status = 204, description = "Account disabled, refresh tokens revoked"),
        (status = 400, description = "Cannot disable own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn disable_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .sessions
        .disable_account(&admin.as_auth(), id, ip.as_deref())
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Enable an account
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/enable",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Target user ID")),
    responses(
        (status = 204, description = "Account enabled"),
        (status = 400, description = "Cannot enable own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn enable_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .sessions
        .enable_account(&admin.as_auth(), id, ip.as_deref())
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Grant a role
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/roles",
    tag = "Admin",
    request_body = GrantRoleRequest,
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Target user ID")),
    responses(
        (status = 204, description = "Role granted"),
        (status = 400, description = "Unknown role, duplicate grant, or self-target"),
        (status = 404, description = "User not found")
    )
)]
pub async fn grant_role(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
    Json(request): Json<GrantRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .sessions
        .grant_role(&admin.as_auth(), id, &request.role, ip.as_deref())
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a role
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}/roles/{role}",
    tag = "Admin",
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Target user ID"),
        ("role" = String, Path, description = "Role name to remove")
    ),
    responses(
        (status = 204, description = "Role removed"),
        (status = 400, description = "Unknown role, absent role, or self-target"),
        (status = 404, description = "User not found")
    )
)]
pub async fn remove_role(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ClientIp(ip): ClientIp,
    Path((id, role)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .sessions
        .remove_role(&admin.as_auth(), id, &role, ip.as_deref())
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// List audit events, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/audit",
    tag = "Admin",
    security(("bearer" = [])),
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-indexed)"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Audit events", body = Vec<AuditEventResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin required")
    )
)]
pub async fn list_audit_events(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
    Pagination(params): Pagination,
) -> ApiResult<Json<Vec<AuditEventResponse>>> {
    let events = state
        .db
        .audit_repo()
        .list_recent(params.limit(MAX_PAGE_SIZE), params.offset())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        events.into_iter().map(AuditEventResponse::from).collect(),
    ))
}
