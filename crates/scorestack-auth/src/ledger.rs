//! Refresh token ledger
//!
//! Every refresh token ever issued has a row in the ledger; rows are flagged
//! revoked rather than deleted. Tokens are opaque random strings, stored
//! as issued and matched by exact value.
//!
//! Rotation is single-use. The consumed token is retired with a conditional
//! update before its successor is issued, so two concurrent refresh calls
//! presenting the same token cannot both succeed: the database decides the
//! winner and the loser is turned away like any other invalid token.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngCore;
use scorestack_db::{DbUser, RefreshTokenRepo, UserRepo};
use uuid::Uuid;

use crate::config::RefreshConfig;
use crate::error::{AuthError, AuthResult};

/// Why a refresh attempt was denied. Private detail for the audit trail;
/// clients see a uniform authentication failure either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDenial {
    /// Unknown, expired, or already-consumed token
    InvalidOrExpired,
    /// The token's owner has been disabled
    AccountDisabled,
}

impl RefreshDenial {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidOrExpired => "invalid_or_expired",
            Self::AccountDisabled => "account_disabled",
        }
    }
}

/// Manages the lifecycle of opaque refresh tokens
#[derive(Clone)]
pub struct RefreshTokenLedger {
    config: RefreshConfig,
    tokens: Arc<RefreshTokenRepo>,
    users: Arc<UserRepo>,
}

impl RefreshTokenLedger {
    pub fn new(config: RefreshConfig, tokens: RefreshTokenRepo, users: UserRepo) -> Self {
        Self {
            config,
            tokens: Arc::new(tokens),
            users: Arc::new(users),
        }
    }

    /// Issue a fresh token for a user and persist it. Returns the bearer
    /// value and its expiry timestamp.
    pub async fn issue(&self, user_id: Uuid) -> AuthResult<(String, i64)> {
        let token = self.generate_token();
        let expires_at = Utc::now()
            + Duration::from_std(self.config.ttl)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let row = self.tokens.insert(&token, user_id, expires_at).await?;

        Ok((token, row.expires_at.timestamp()))
    }

    /// Consume a refresh token and issue its successor.
    ///
    /// On success returns the owning user and the replacement token. On
    /// denial returns the private reason; callers map every denial to the
    /// same client-visible authentication failure.
    pub async fn rotate(
        &self,
        token: &str,
    ) -> AuthResult<Result<(DbUser, String, i64), RefreshDenial>> {
        let row = match self.tokens.find_by_token(token).await? {
            Some(row) => row,
            None => return Ok(Err(RefreshDenial::InvalidOrExpired)),
        };

        if !row.is_active() {
            return Ok(Err(RefreshDenial::InvalidOrExpired));
        }

        let user = match self.users.find_by_id(row.user_id).await? {
            Some(user) => user,
            None => return Ok(Err(RefreshDenial::InvalidOrExpired)),
        };

        if user.disabled {
            return Ok(Err(RefreshDenial::AccountDisabled));
        }

        let new_token = self.generate_token();
        let expires_at = Utc::now()
            + Duration::from_std(self.config.ttl)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        // Retirement and successor insert happen in one transaction; the
        // conditional update inside is the race arbiter. Losing means a
        // concurrent call already consumed this token.
        match self
            .tokens
            .rotate(token, &new_token, user.id, expires_at)
            .await?
        {
            Some(row) => Ok(Ok((user, new_token, row.expires_at.timestamp()))),
            None => Ok(Err(RefreshDenial::InvalidOrExpired)),
        }
    }

    /// Explicitly revoke a token. Only the owner or an admin may revoke;
    /// an unknown token is NotFound rather than a silent success.
    pub async fn revoke(
        &self,
        token: &str,
        caller_id: Uuid,
        caller_is_admin: bool,
    ) -> AuthResult<()> {
        let row = self
            .tokens
            .find_by_token(token)
            .await?
            .ok_or_else(|| AuthError::NotFound("Refresh token not found".to_string()))?;

        if row.user_id != caller_id && !caller_is_admin {
            return Err(AuthError::Forbidden);
        }

        self.tokens.mark_revoked(token).await?;
        Ok(())
    }

    /// Revoke every outstanding token for a user. Returns how many were
    /// revoked. Used by the account-disable cascade.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<u64> {
        Ok(self.tokens.revoke_all_for_user(user_id).await?)
    }

    /// Generate a cryptographically secure opaque token
    fn generate_token(&self) -> String {
        let mut bytes = vec![0u8; self.config.token_bytes];
        rand::thread_rng().fill_bytes(&mut bytes);
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorestack_db::Database;

    fn test_ledger() -> RefreshTokenLedger {
        let db = Database::new_mock();
        RefreshTokenLedger::new(RefreshConfig::default(), db.refresh_token_repo(), db.user_repo())
    }

    #[tokio::test]
    async fn test_generated_tokens_are_unique_and_long() {
        let ledger = test_ledger();
        let a = ledger.generate_token();
        let b = ledger.generate_token();

        assert_ne!(a, b);
        // 64 random bytes come out to 86 base64 characters
        assert!(a.len() >= 86);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_denial_reasons() {
        assert_eq!(RefreshDenial::InvalidOrExpired.as_str(), "invalid_or_expired");
        assert_eq!(RefreshDenial::AccountDisabled.as_str(), "account_disabled");
    }
}
