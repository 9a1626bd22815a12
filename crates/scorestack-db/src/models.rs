//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub disabled: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Refresh Token Ledger
// ============================================================================

/// One row per issued refresh token. Rows are never deleted; `revoked` is the
/// only mutable column. Expiry is evaluated at lookup time, never written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbRefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl DbRefreshToken {
    /// Check if the token is expired
    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the token can still mint successors (not revoked, not expired)
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}

// ============================================================================
// Audit Trail
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAuditEvent {
    pub id: Uuid,
    pub event_type: String,
    pub actor: Option<String>,
    pub target: Option<String>,
    pub source_ip: Option<String>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(revoked: bool, expires_in: Duration) -> DbRefreshToken {
        DbRefreshToken {
            id: Uuid::new_v4(),
            token: "tok".to_string(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            expires_at: Utc::now() + expires_in,
            revoked,
        }
    }

    #[test]
    fn test_active_token() {
        assert!(token(false, Duration::days(7)).is_active());
    }

    #[test]
    fn test_revoked_token_is_not_active() {
        assert!(!token(true, Duration::days(7)).is_active());
    }

    #[test]
    fn test_expired_token_is_not_active() {
        let t = token(false, Duration::seconds(-1));
        assert!(t.is_expired());
        assert!(!t.is_active());
    }
}
