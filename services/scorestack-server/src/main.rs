//! Scorestack API Server
//!
//! REST API server for the Scorestack catalog backend. Hosts the
//! authentication, account, and audit administration endpoints.
//!
//! # Features
//!
//! - JWT access tokens with rotating single-use refresh tokens
//! - Role-based admin endpoints
//! - OpenAPI documentation with Swagger UI
//! - Graceful shutdown handling
//! - Health check endpoints
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! scorestack-server
//!
//! # Start with custom config
//! scorestack-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! SCORESTACK__SERVER__PORT=8080 scorestack-server
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scorestack_api::{create_router, ApiConfig, AppState};
use scorestack_auth::{AuthConfig, AuthService};
use scorestack_db::{Database, DatabaseConfig as DbConfig};

use crate::config::ServerConfig;

/// Secret substituted for the placeholder in dev mode. Long enough to pass
/// auth-config validation, loudly insecure by name.
const DEV_JWT_SECRET: &str = "scorestack-dev-mode-only-insecure-secret";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Scorestack API Server - authentication and account management backend
#[derive(Parser, Debug)]
#[command(name = "scorestack-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "SCORESTACK_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "SCORESTACK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SCORESTACK_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SCORESTACK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "SCORESTACK_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JWT secret key
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Enable development mode (relaxed security)
    #[arg(long, env = "SCORESTACK_DEV_MODE")]
    dev_mode: bool,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.database.postgres_url = db_url;
    }
    if let Some(jwt_secret) = args.jwt_secret {
        server_config.auth.jwt_secret = jwt_secret;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    // Initialize logging
    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Scorestack API Server"
    );

    // Validate configuration
    validate_config(&server_config, args.dev_mode)?;

    // In dev mode the placeholder secret is replaced with a known-insecure
    // one that satisfies the length requirement
    if args.dev_mode && server_config.auth.jwt_secret == "change-me-in-production" {
        tracing::warn!("Dev mode: using the built-in insecure JWT secret");
        server_config.auth.jwt_secret = DEV_JWT_SECRET.to_string();
    }

    // Initialize database
    let db = init_database(&server_config.database).await?;

    // Initialize auth service
    let auth = init_auth(&server_config.auth, db.clone())?;

    // Create application state
    let state = Arc::new(AppState::new(db, auth));

    // Create API configuration
    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_compression: server_config.api.enable_compression,
        enable_tracing: server_config.api.enable_tracing,
    };

    // Create router
    let app = create_router(state, api_config);

    // Get bind address
    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    drain_with_deadline(server, server_config.server.shutdown_timeout()).await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

/// Validate configuration
fn validate_config(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<()> {
    // Refuse to mint tokens against the default secret outside dev mode
    if !dev_mode && config.auth.jwt_secret == "change-me-in-production" {
        anyhow::bail!(
            "JWT secret must be changed in production. Set JWT_SECRET environment variable."
        );
    }

    Ok(())
}

/// Initialize database connection
async fn init_database(config: &config::DatabaseSettings) -> anyhow::Result<Arc<Database>> {
    tracing::info!("Connecting to database...");

    let db_config = DbConfig {
        postgres_url: config.postgres_url.clone(),
        pg_max_connections: config.max_connections,
        pg_min_connections: config.min_connections,
        pg_acquire_timeout_secs: config.connect_timeout_secs,
    };

    let db = Database::connect(&db_config).await?;

    tracing::info!("Database connected successfully");

    if config.run_migrations {
        db.migrate().await?;
    }

    // Run health check
    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(postgres = health.postgres, "Database health check passed");

    Ok(Arc::new(db))
}

/// Initialize authentication service
fn init_auth(config: &config::AuthSettings, db: Arc<Database>) -> anyhow::Result<Arc<AuthService>> {
    tracing::info!("Initializing authentication service...");

    let mut auth_config = AuthConfig::default();
    auth_config.jwt.secret = config.jwt_secret.clone();
    auth_config.jwt.issuer = config.jwt_issuer.clone();
    auth_config.jwt.access_token_lifetime = Duration::from_secs(config.access_token_lifetime_secs);
    auth_config.refresh.ttl = Duration::from_secs(config.refresh_token_lifetime_secs);
    auth_config.password.pepper = config.password_pepper.clone();
    auth_config.password.min_length = config.password_min_length;

    // A bad secret or zero lifetime must kill the process at startup
    auth_config.validate()?;

    let auth_service = AuthService::new(db, auth_config);

    tracing::info!("Authentication service initialized");

    Ok(Arc::new(auth_service))
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Wait for the server task to finish draining in-flight requests, but no
/// longer than the configured deadline. Returns as soon as the drain
/// completes; only a server still busy at the deadline is cut off.
async fn drain_with_deadline(
    server: tokio::task::JoinHandle<std::io::Result<()>>,
    deadline: Duration,
) -> anyhow::Result<()> {
    match tokio::time::timeout(deadline, server).await {
        Ok(joined) => Ok(joined??),
        Err(_) => {
            tracing::warn!(
                timeout_secs = deadline.as_secs(),
                "Drain deadline reached before in-flight requests completed"
            );
            Ok(())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["scorestack-server", "--port", "8080"]);
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_development_config() {
        let config = ServerConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_default_secret_rejected_outside_dev_mode() {
        let config = ServerConfig::development();
        assert!(validate_config(&config, false).is_err());
        assert!(validate_config(&config, true).is_ok());
    }

    #[test]
    fn test_dev_secret_passes_auth_validation() {
        let mut auth_config = scorestack_auth::AuthConfig::default();
        auth_config.jwt.secret = DEV_JWT_SECRET.to_string();
        assert!(auth_config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_drain_completes_before_deadline() {
        let server = tokio::spawn(async { Ok::<(), std::io::Error>(()) });
        assert!(drain_with_deadline(server, Duration::from_secs(1))
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_deadline_caps_wait() {
        let server = tokio::spawn(async {
            std::future::pending::<()>().await;
            Ok::<(), std::io::Error>(())
        });
        assert!(drain_with_deadline(server, Duration::from_millis(10))
            .await
            .is_ok());
    }
}
