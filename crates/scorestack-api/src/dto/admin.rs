//! Admin DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Username
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    /// Email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Initial password
    #[validate(length(min = 12, message = "Password must be at least 12 characters"))]
    pub password: String,
    /// Initial roles (role names from the closed set)
    #[serde(default)]
    pub roles: Vec<String>,
}

/// User response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Roles
    pub roles: Vec<String>,
    /// Whether the account is disabled
    pub disabled: bool,
    /// Created timestamp (milliseconds)
    pub created_at: i64,
}

impl From<scorestack_db::DbUser> for UserResponse {
    fn from(user: scorestack_db::DbUser) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            roles: user.roles,
            disabled: user.disabled,
            created_at: user.created_at.timestamp_millis(),
        }
    }
}

/// Grant role request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrantRoleRequest {
    /// Role name to grant
    pub role: String,
}

/// Audit event response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditEventResponse {
    /// Event ID
    pub id: String,
    /// Event type (stable identifier)
    pub event_type: String,
    /// Acting username, if known
    pub actor: Option<String>,
    /// Target of the action, if any
    pub target: Option<String>,
    /// Source IP, if known
    pub source_ip: Option<String>,
    /// Event-specific detail
    pub detail: Option<String>,
    /// Recorded timestamp (milliseconds)
    pub created_at: i64,
}

impl From<scorestack_db::DbAuditEvent> for AuditEventResponse {
    fn from(event: scorestack_db::DbAuditEvent) -> Self {
        Self {
            id: event.id.to_string(),
            event_type: event.event_type,
            actor: event.actor,
            target: event.target,
            source_ip: event.source_ip,
            detail: event.detail,
            created_at: event.created_at.timestamp_millis(),
        }
    }
}
