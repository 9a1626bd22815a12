//! API routes

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
}

/// Authentication routes
fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/revoke", post(handlers::auth::revoke_token))
}

/// Account routes (authenticated)
fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::account::get_profile))
        .route("/credentials", put(handlers::account::update_credentials))
}

/// Admin routes
fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(handlers::admin::create_user))
        .route("/users", get(handlers::admin::list_users))
        .route("/users/:id/disable", post(handlers::admin::disable_user))
        .route("/users/:id/enable", post(handlers::admin::enable_user))
        .route("/users/:id/roles", post(handlers::admin::grant_role))
        .route(
            "/users/:id/roles/:role",
            delete(handlers::admin::remove_role),
        )
        .route("/audit", get(handlers::admin::list_audit_events))
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
