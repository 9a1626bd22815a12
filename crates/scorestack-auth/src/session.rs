//! Session lifecycle service
//!
//! Orchestrates login, token refresh, revocation, credential updates, and
//! the admin account/role operations. This is the only place the individual
//! pieces (credential store, token issuer, ledger, audit trail) are wired
//! together into complete flows.
//!
//! Login failures are indistinguishable to the caller: unknown username,
//! disabled account, and wrong password all produce the same response. The
//! audit trail records which it was.

use std::sync::Arc;

use scorestack_db::{DbUser, UserRepo};
use uuid::Uuid;

use crate::audit::{AuditRecorder, SecurityEvent};
use crate::error::{AuthError, AuthResult};
use crate::ledger::{RefreshDenial, RefreshTokenLedger};
use crate::password::PasswordService;
use crate::token::TokenIssuer;
use crate::types::{AuthenticatedUser, Role, TokenPair};

/// Session lifecycle orchestrator
#[derive(Clone)]
pub struct SessionService {
    users: Arc<UserRepo>,
    passwords: PasswordService,
    tokens: TokenIssuer,
    ledger: RefreshTokenLedger,
    audit: AuditRecorder,
}

impl SessionService {
    pub fn new(
        users: UserRepo,
        passwords: PasswordService,
        tokens: TokenIssuer,
        ledger: RefreshTokenLedger,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            users: Arc::new(users),
            passwords,
            tokens,
            ledger,
            audit,
        }
    }

    // =========================================================================
    // Login and token lifecycle
    // =========================================================================

    /// Authenticate a username/password pair and start a session.
    ///
    /// The disabled check runs before the password check: a disabled account
    /// is rejected even when the password is correct, and no work is spent
    /// hashing for an account that cannot log in.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        source_ip: Option<&str>,
    ) -> AuthResult<(DbUser, TokenPair)> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                self.audit
                    .record(
                        SecurityEvent::LoginFailure,
                        Some(username),
                        None,
                        source_ip,
                        Some("unknown_user"),
                    )
                    .await;
                return Err(AuthError::Unauthenticated);
            }
        };

        if user.disabled {
            self.audit
                .record(
                    SecurityEvent::LoginFailure,
                    Some(username),
                    None,
                    source_ip,
                    Some("disabled_account"),
                )
                .await;
            return Err(AuthError::Unauthenticated);
        }

        if !self
            .passwords
            .verify_password(password, &user.password_hash)?
        {
            self.audit
                .record(
                    SecurityEvent::LoginFailure,
                    Some(username),
                    None,
                    source_ip,
                    Some("wrong_password"),
                )
                .await;
            return Err(AuthError::Unauthenticated);
        }

        let pair = self.issue_token_pair(&user).await?;

        self.audit
            .record(
                SecurityEvent::LoginSuccess,
                Some(&user.username),
                None,
                source_ip,
                None,
            )
            .await;

        Ok((user, pair))
    }

    /// Exchange a refresh token for a new token pair, retiring the old one.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        source_ip: Option<&str>,
    ) -> AuthResult<(DbUser, TokenPair)> {
        let (user, new_refresh, refresh_expires_at) =
            match self.ledger.rotate(refresh_token).await? {
                Ok(rotated) => rotated,
                Err(denial) => {
                    tracing::warn!(
                        reason = denial.as_str(),
                        source_ip = source_ip.unwrap_or("unknown"),
                        "Refresh token rejected"
                    );
                    return Err(AuthError::Unauthenticated);
                }
            };

        let roles = parse_roles(&user.roles)?;
        let (access_token, access_expires_at) =
            self.tokens
                .mint(user.id, &user.username, &user.email, &roles)?;

        self.audit
            .record(
                SecurityEvent::TokenRefresh,
                Some(&user.username),
                None,
                source_ip,
                None,
            )
            .await;

        let pair = TokenPair::new(
            access_token,
            new_refresh,
            access_expires_at,
            refresh_expires_at,
        );

        Ok((user, pair))
    }

    /// Explicitly revoke a refresh token. Owner or admin only.
    pub async fn revoke(&self, refresh_token: &str, caller: &AuthenticatedUser) -> AuthResult<()> {
        self.ledger
            .revoke(refresh_token, caller.user_id, caller.is_admin())
            .await
    }

    // =========================================================================
    // Account management
    // =========================================================================

    /// Create a new user account with an initial role set
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        roles: &[Role],
    ) -> AuthResult<DbUser> {
        let hash = self.passwords.hash_password(password)?;
        let role_names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();

        let user = self.users.create(username, email, &hash, &role_names).await?;

        Ok(user)
    }

    /// Update the caller's own email and/or password. An email change is
    /// unconditional; a password change requires the current password to be
    /// re-verified even though the caller already holds a valid access token.
    pub async fn update_credentials(
        &self,
        caller: &AuthenticatedUser,
        current_password: Option<&str>,
        new_email: Option<&str>,
        new_password: Option<&str>,
    ) -> AuthResult<()> {
        let user = self
            .users
            .find_by_id(caller.user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        if let Some(password) = new_password {
            let current = current_password.ok_or_else(|| {
                AuthError::Validation(
                    "Current password is required to change the password".to_string(),
                )
            })?;

            if !self
                .passwords
                .verify_password(current, &user.password_hash)?
            {
                return Err(AuthError::Unauthenticated);
            }

            let hash = self.passwords.hash_password(password)?;
            self.users.update_password(user.id, &hash).await?;
        }

        if let Some(email) = new_email {
            self.users.update_email(user.id, email).await?;
        }

        Ok(())
    }

    /// Disable an account and revoke all of its outstanding refresh tokens.
    ///
    /// Outstanding access tokens stay valid until they expire; the cascade
    /// only guarantees the account cannot obtain new tokens.
    pub async fn disable_account(
        &self,
        actor: &AuthenticatedUser,
        target_id: Uuid,
        source_ip: Option<&str>,
    ) -> AuthResult<()> {
        if actor.user_id == target_id {
            return Err(AuthError::Validation(
                "Cannot disable your own account".to_string(),
            ));
        }

        let target = self
            .users
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        self.users.set_disabled(target_id, true).await?;
        let revoked = self.ledger.revoke_all_for_user(target_id).await?;

        tracing::info!(
            target = %target.username,
            revoked_tokens = revoked,
            "Account disabled"
        );

        self.audit
            .record(
                SecurityEvent::AccountDisable,
                Some(&actor.username),
                Some(&target.username),
                source_ip,
                None,
            )
            .await;

        Ok(())
    }

    /// Re-enable a disabled account. Previously revoked refresh tokens stay
    /// revoked; the user logs in again to get new ones.
    pub async fn enable_account(
        &self,
        actor: &AuthenticatedUser,
        target_id: Uuid,
        source_ip: Option<&str>,
    ) -> AuthResult<()> {
        if actor.user_id == target_id {
            return Err(AuthError::Validation(
                "Cannot enable your own account".to_string(),
            ));
        }

        let target = self
            .users
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        self.users.set_disabled(target_id, false).await?;

        self.audit
            .record(
                SecurityEvent::AccountEnable,
                Some(&actor.username),
                Some(&target.username),
                source_ip,
                None,
            )
            .await;

        Ok(())
    }

    // =========================================================================
    // Role management
    // =========================================================================

    /// Grant a role to a user. Rejects self-targeting, unknown role names,
    /// and roles the user already holds.
    pub async fn grant_role(
        &self,
        actor: &AuthenticatedUser,
        target_id: Uuid,
        role_name: &str,
        source_ip: Option<&str>,
    ) -> AuthResult<()> {
        if actor.user_id == target_id {
            return Err(AuthError::Validation(
                "Cannot modify your own roles".to_string(),
            ));
        }

        let role: Role = role_name.parse()?;

        let target = self
            .users
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        if target.roles.iter().any(|r| r == role.as_str()) {
            return Err(AuthError::Validation(format!(
                "User already has role {}",
                role
            )));
        }

        self.users.add_role(target_id, role.as_str()).await?;

        self.audit
            .record(
                SecurityEvent::RoleGrant,
                Some(&actor.username),
                Some(&target.username),
                source_ip,
                Some(role.as_str()),
            )
            .await;

        Ok(())
    }

    /// Remove a role from a user. Rejects self-targeting, unknown role
    /// names, and roles the user does not hold.
    pub async fn remove_role(
        &self,
        actor: &AuthenticatedUser,
        target_id: Uuid,
        role_name: &str,
        source_ip: Option<&str>,
    ) -> AuthResult<()> {
        if actor.user_id == target_id {
            return Err(AuthError::Validation(
                "Cannot modify your own roles".to_string(),
            ));
        }

        let role: Role = role_name.parse()?;

        let target = self
            .users
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        if !target.roles.iter().any(|r| r == role.as_str()) {
            return Err(AuthError::Validation(format!(
                "User does not have role {}",
                role
            )));
        }

        self.users.remove_role(target_id, role.as_str()).await?;

        self.audit
            .record(
                SecurityEvent::RoleRemove,
                Some(&actor.username),
                Some(&target.username),
                source_ip,
                Some(role.as_str()),
            )
            .await;

        Ok(())
    }

    // =========================================================================
    // Audit hooks for callers outside this crate
    // =========================================================================

    /// Record that an authenticated user downloaded a file. The download
    /// itself is served elsewhere; only the audit trail lives here.
    pub async fn record_file_download(
        &self,
        actor: &AuthenticatedUser,
        file_name: &str,
        source_ip: Option<&str>,
    ) {
        self.audit
            .record(
                SecurityEvent::FileDownload,
                Some(&actor.username),
                None,
                source_ip,
                Some(file_name),
            )
            .await;
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn issue_token_pair(&self, user: &DbUser) -> AuthResult<TokenPair> {
        let roles = parse_roles(&user.roles)?;
        let (access_token, access_expires_at) =
            self.tokens
                .mint(user.id, &user.username, &user.email, &roles)?;
        let (refresh_token, refresh_expires_at) = self.ledger.issue(user.id).await?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        ))
    }
}

/// Parse stored role names. A bad name in storage means the closed-set gate
/// was bypassed somewhere; surface it as an internal error.
fn parse_roles(names: &[String]) -> AuthResult<Vec<Role>> {
    names
        .iter()
        .map(|name| {
            name.parse()
                .map_err(|_| AuthError::Internal(format!("Unknown stored role: {}", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        let roles = parse_roles(&["member".to_string(), "admin".to_string()]).unwrap();
        assert_eq!(roles, vec![Role::Member, Role::Admin]);
    }

    #[test]
    fn test_parse_roles_rejects_unknown() {
        let err = parse_roles(&["overlord".to_string()]).unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
