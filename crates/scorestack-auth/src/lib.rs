//! Scorestack Authentication Layer
//!
//! Authentication and session lifecycle for the catalog backend:
//!
//! - **Access tokens**: short-lived JWTs (HS256), verified statelessly
//! - **Refresh tokens**: opaque, single-use, rotated through a persistent
//!   ledger with a 7-day TTL
//! - **Password security**: Argon2id hashing with optional pepper
//! - **Revocation**: explicit per-token revoke, plus a cascade that revokes
//!   every outstanding refresh token when an account is disabled
//! - **Audit trail**: best-effort append-only record of security events
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Request → AuthLayer (JWT verify) → Handler              │
//! │                                        │                 │
//! │                                 SessionService           │
//! │                     ┌────────┬─────────┼────────┐        │
//! │                     ▼        ▼         ▼        ▼        │
//! │               TokenIssuer Password  Ledger  AuditRecorder│
//! │                           Service      │        │        │
//! │                                        ▼        ▼        │
//! │                                  refresh_tokens audit_events
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;
pub mod types;

pub use audit::{AuditRecorder, SecurityEvent};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use ledger::{RefreshDenial, RefreshTokenLedger};
pub use middleware::{auth_error_response, AuthLayer, AuthMiddleware};
pub use password::PasswordService;
pub use session::SessionService;
pub use token::TokenIssuer;
pub use types::*;

use scorestack_db::Database;
use std::sync::Arc;

/// Main authentication service combining all components
pub struct AuthService {
    pub tokens: TokenIssuer,
    pub passwords: PasswordService,
    pub ledger: RefreshTokenLedger,
    pub sessions: SessionService,
    pub audit: AuditRecorder,
    db: Arc<Database>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: Arc<Database>, config: AuthConfig) -> Self {
        let tokens = TokenIssuer::new(config.jwt.clone());
        let passwords = PasswordService::new(config.password.clone());
        let audit = AuditRecorder::new(db.audit_repo());
        let ledger = RefreshTokenLedger::new(
            config.refresh.clone(),
            db.refresh_token_repo(),
            db.user_repo(),
        );
        let sessions = SessionService::new(
            db.user_repo(),
            passwords.clone(),
            tokens.clone(),
            ledger.clone(),
            audit.clone(),
        );

        Self {
            tokens,
            passwords,
            ledger,
            sessions,
            audit,
            db,
            config,
        }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create the authorization guard layer for an axum router
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(Arc::new(self.tokens.clone()))
    }
}

impl Clone for AuthService {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            passwords: self.passwords.clone(),
            ledger: self.ledger.clone(),
            sessions: self.sessions.clone(),
            audit: self.audit.clone(),
            db: self.db.clone(),
            config: self.config.clone(),
        }
    }
}
