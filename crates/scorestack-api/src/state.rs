//! Application state shared across handlers

use scorestack_auth::AuthService;
use scorestack_db::Database;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connections
    pub db: Arc<Database>,
    /// Authentication service
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: Arc<Database>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    /// Create state for testing (backed by a lazy mock pool)
    #[cfg(test)]
    pub fn test() -> Self {
        use scorestack_auth::AuthConfig;

        let db = Arc::new(Database::new_mock());
        let mut auth_config = AuthConfig::default();
        auth_config.jwt.secret = "test-secret-key-at-least-32-bytes-long!!".to_string();
        let auth = Arc::new(AuthService::new(db.clone(), auth_config));

        Self { db, auth }
    }
}
