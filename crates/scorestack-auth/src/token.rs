//! Access token issuer
//!
//! Mints and verifies the short-lived JWT access tokens (HS256). Access
//! tokens are deliberately not revocable: there is no denylist and no
//! per-request database check, so verification stays a pure signature and
//! claims check. Revocation only exists for refresh tokens, in the ledger.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::{AccessClaims, AuthenticatedUser, Role};

/// Issues and verifies JWT access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mint an access token for a user. Roles are snapshotted into the
    /// claims as they stand right now.
    pub fn mint(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        roles: &[Role],
    ) -> AuthResult<(String, i64)> {
        let now = Utc::now();
        let exp = now
            + Duration::from_std(self.config.access_token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = AccessClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode access token: {}", e)))?;

        Ok((token, exp.timestamp()))
    }

    /// Verify a token's signature, expiry, and issuer, returning its claims
    pub fn verify(&self, token: &str) -> AuthResult<AccessClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_exp = true;

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Verify a token and build the authenticated identity from its claims
    pub fn authenticate(&self, token: &str) -> AuthResult<AuthenticatedUser> {
        let claims = self.verify(token)?;
        let user_id = claims.user_id()?;

        Ok(AuthenticatedUser {
            user_id,
            username: claims.username,
            email: claims.email,
            roles: claims.roles,
        })
    }

    /// Extract the user ID without validating the token. For logging only;
    /// never use this for an authorization decision.
    pub fn extract_user_id(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);
        validation.iss = None;

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .ok()
            .and_then(|data| Uuid::parse_str(&data.claims.sub).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            access_token_lifetime: std::time::Duration::from_secs(3600),
            issuer: "test-issuer".to_string(),
        }
    }

    #[test]
    fn test_mint_and_verify() {
        let issuer = TokenIssuer::new(test_config());
        let user_id = Uuid::new_v4();

        let (token, expires_at) = issuer
            .mint(user_id, "alice", "alice@example.com", &[Role::Member])
            .unwrap();
        assert!(!token.is_empty());
        assert!(expires_at > Utc::now().timestamp());

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, vec![Role::Member]);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn test_authenticate_builds_identity() {
        let issuer = TokenIssuer::new(test_config());
        let user_id = Uuid::new_v4();

        let (token, _) = issuer
            .mint(user_id, "bob", "bob@example.com", &[Role::Member, Role::Admin])
            .unwrap();

        let user = issuer.authenticate(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert!(user.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new(test_config());
        let (token, _) = issuer
            .mint(Uuid::new_v4(), "alice", "alice@example.com", &[])
            .unwrap();

        let mut other_config = test_config();
        other_config.secret = "a-completely-different-secret-32-bytes!!".to_string();
        let other = TokenIssuer::new(other_config);

        assert!(matches!(
            other.verify(&token),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let mut config = test_config();
        let issuer = TokenIssuer::new(config.clone());
        let (token, _) = issuer
            .mint(Uuid::new_v4(), "alice", "alice@example.com", &[])
            .unwrap();

        config.issuer = "someone-else".to_string();
        let other = TokenIssuer::new(config);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = TokenIssuer::new(test_config());
        assert!(issuer.verify("not-a-token").is_err());
    }

    #[test]
    fn test_extract_user_id_skips_validation() {
        let issuer = TokenIssuer::new(test_config());
        let user_id = Uuid::new_v4();
        let (token, _) = issuer
            .mint(user_id, "alice", "alice@example.com", &[])
            .unwrap();

        assert_eq!(issuer.extract_user_id(&token), Some(user_id));
        assert_eq!(issuer.extract_user_id("garbage"), None);
    }
}
