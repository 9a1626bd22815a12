//! Account DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Update own credentials. An email change stands on its own; a password
/// change additionally requires the current password, re-verified even though
/// the caller already holds a valid access token.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCredentialsRequest {
    /// Current password, required when changing the password
    #[serde(default)]
    pub current_password: Option<String>,
    /// New email address
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// New password
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Own profile response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Roles
    pub roles: Vec<String>,
}
