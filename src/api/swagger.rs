use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users Service API",
        version = "1.0.0",
        description = "User registration, sign-in and JWT refresh, plus organization management.\n\n**Authentication:** `/users/me` and `/organizations` require an access token as `Authorization: Bearer <token>`. Access tokens expire; use `/refresh-token` with the refresh token from sign-in to get a new one."
    ),
    paths(
        // Users
        crate::api::auth::register,
        crate::api::auth::signin,
        crate::api::auth::refresh_token,
        crate::api::auth::me,

        // Organizations
        crate::api::organizations::create_organization,
        crate::api::organizations::list_organizations,
        crate::api::organizations::get_organization,
        crate::api::organizations::update_organization,
        crate::api::organizations::delete_organization,
        crate::api::organizations::add_member,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::SignInRequest,
            crate::services::auth_service::RefreshTokenRequest,
            crate::services::auth_service::TokenResponse,
            crate::models::PublicUser,
            crate::models::CreateOrganizationRequest,
            crate::models::UpdateOrganizationRequest,
            crate::models::AddMemberRequest,
            crate::models::OrganizationResponse,
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Users", description = "Registration, password sign-in and access-token refresh."),
        (name = "Organizations", description = "Owner-scoped organization management."),
        (name = "Health", description = "Health check and auth counters."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /users/signin"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_auth_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/users/register", "/users/signin", "/refresh-token", "/users/me", "/organizations/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
