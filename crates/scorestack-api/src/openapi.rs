//! OpenAPI documentation

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::extractors::PaginationParams;
use crate::handlers;

/// Scorestack API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scorestack API",
        description = "Authentication and account management API for the Scorestack catalog backend.",
        version = "1.0.0",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Auth
        handlers::auth::login,
        handlers::auth::refresh_token,
        handlers::auth::revoke_token,
        // Account
        handlers::account::get_profile,
        handlers::account::update_credentials,
        // Admin
        handlers::admin::create_user,
        handlers::admin::list_users,
        handlers::admin::disable_user,
        handlers::admin::enable_user,
        handlers::admin::grant_role,
        handlers::admin::remove_role,
        handlers::admin::list_audit_events,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationParams,
            dto::LoginRequest,
            dto::TokenResponse,
            dto::RefreshTokenRequest,
            dto::RevokeTokenRequest,
            dto::UpdateCredentialsRequest,
            dto::ProfileResponse,
            dto::CreateUserRequest,
            dto::UserResponse,
            dto::GrantRoleRequest,
            dto::AuditEventResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Authentication", description = "Login, token refresh, and revocation"),
        (name = "Account", description = "Own account management"),
        (name = "Admin", description = "User, role, and audit administration")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Scorestack API");
        assert_eq!(spec.info.version, "1.0.0");
    }
}
