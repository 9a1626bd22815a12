//! Core authentication types
//!
//! Shared types used across all authentication components.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

// =============================================================================
// Roles
// =============================================================================

/// The closed set of roles a user can hold. Role grants name one of these or
/// are rejected; there is no free-form role text anywhere past the API edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular catalog user
    Member,
    /// Can modify catalog content
    Editor,
    /// Full administrative access
    Admin,
}

impl Role {
    /// All known roles, in grant-precedence order
    pub const ALL: [Role; 3] = [Role::Member, Role::Editor, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Member
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// The single gate where role text becomes a role. Unknown names are a
    /// validation error, never silently stored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "editor" => Ok(Self::Editor),
            "admin" => Ok(Self::Admin),
            other => Err(AuthError::Validation(format!("Unknown role: {other}"))),
        }
    }
}

// =============================================================================
// Authenticated identity
// =============================================================================

/// Authenticated user information extracted from a verified access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User ID
    pub user_id: Uuid,
    /// Username
    pub username: String,
    /// User email
    pub email: String,
    /// Roles held at token-issue time
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    /// Check if the user holds a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

// =============================================================================
// Token types
// =============================================================================

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived JWT access token
    pub access_token: String,
    /// Opaque single-use refresh token
    pub refresh_token: String,
    /// Access token expiry (Unix timestamp)
    pub access_expires_at: i64,
    /// Refresh token expiry (Unix timestamp)
    pub refresh_expires_at: i64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_at: i64,
        refresh_expires_at: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
            token_type: "Bearer".to_string(),
        }
    }
}

/// JWT claims carried by every access token.
///
/// Roles are snapshotted at issue time. Access tokens are not revocable, so a
/// role change or account disable only takes effect once outstanding tokens
/// expire (at most the access-token lifetime later).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// User email
    pub email: String,
    /// Roles at issue time
    pub roles: Vec<Role>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID (unique per token)
    pub jti: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::Unauthenticated)
    }
}
