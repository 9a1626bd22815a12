//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Timestamp (milliseconds)
    pub timestamp: i64,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall status
    pub status: String,
    /// Database status
    pub database: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    /// Component name
    pub name: String,
    /// Status (healthy/unhealthy)
    pub status: String,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint
///
/// Lightweight liveness check, does not touch dependencies.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// Readiness check endpoint
///
/// Verifies database connectivity; 503 until the pool answers.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    )
)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let (database, healthy) = match state.db.health_check().await {
        Ok(health) if health.postgres => (
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "healthy".to_string(),
                error: None,
            },
            true,
        ),
        Ok(_) => (
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "unhealthy".to_string(),
                error: Some("PostgreSQL health check failed".to_string()),
            },
            false,
        ),
        Err(e) => (
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "unhealthy".to_string(),
                error: Some(e.to_string()),
            },
            false,
        ),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: if healthy { "ready" } else { "not_ready" }.to_string(),
            database,
        }),
    )
}
