use actix_web::{web, HttpResponse, ResponseError};

use crate::database::MongoDB;
use crate::models::{
    AddMemberRequest, CreateOrganizationRequest, OrganizationResponse, UpdateOrganizationRequest,
};
use crate::services::{organization_service, Claims};
use crate::utils::AppError;

fn error_response(e: AppError) -> HttpResponse {
    match &e {
        AppError::DatabaseError(msg) => log::error!("❌ Organization query failed: {}", msg),
        other => log::warn!("⚠️ {}", other),
    }
    e.error_response()
}

/// POST /organizations
#[utoipa::path(
    post,
    path = "/organizations",
    tag = "Organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationResponse),
        (status = 400, description = "Invalid name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_organization(
    claims: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    request: web::Json<CreateOrganizationRequest>,
) -> HttpResponse {
    log::info!("🏢 POST /organizations - owner {}", claims.sub);

    match organization_service::create_organization(&db, &claims.sub, &request).await {
        Ok(organization) => HttpResponse::Created().json(organization),
        Err(e) => error_response(e),
    }
}

/// GET /organizations
#[utoipa::path(
    get,
    path = "/organizations",
    tag = "Organizations",
    responses(
        (status = 200, description = "Organizations the caller belongs to", body = [OrganizationResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_organizations(claims: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📋 GET /organizations - {}", claims.sub);

    match organization_service::list_organizations(&db, &claims.sub).await {
        Ok(organizations) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "total": organizations.len(),
            "organizations": organizations
        })),
        Err(e) => error_response(e),
    }
}

/// GET /organizations/{id}
#[utoipa::path(
    get,
    path = "/organizations/{id}",
    tag = "Organizations",
    params(("id" = String, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization", body = OrganizationResponse),
        (status = 404, description = "Not found or caller is not a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_organization(
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> HttpResponse {
    let id = path.into_inner();

    match organization_service::get_organization(&db, &claims.sub, &id).await {
        Ok(organization) => HttpResponse::Ok().json(organization),
        Err(e) => error_response(e),
    }
}

/// PUT /organizations/{id}
#[utoipa::path(
    put,
    path = "/organizations/{id}",
    tag = "Organizations",
    params(("id" = String, Path, description = "Organization id")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = OrganizationResponse),
        (status = 404, description = "Not found or caller is not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_organization(
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    request: web::Json<UpdateOrganizationRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PUT /organizations/{} - {}", id, claims.sub);

    match organization_service::update_organization(&db, &claims.sub, &id, &request).await {
        Ok(organization) => HttpResponse::Ok().json(organization),
        Err(e) => error_response(e),
    }
}

/// DELETE /organizations/{id}
#[utoipa::path(
    delete,
    path = "/organizations/{id}",
    tag = "Organizations",
    params(("id" = String, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization deleted"),
        (status = 404, description = "Not found or caller is not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_organization(
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /organizations/{} - {}", id, claims.sub);

    match organization_service::delete_organization(&db, &claims.sub, &id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Organization deleted"
        })),
        Err(e) => error_response(e),
    }
}

/// POST /organizations/{id}/members
#[utoipa::path(
    post,
    path = "/organizations/{id}/members",
    tag = "Organizations",
    params(("id" = String, Path, description = "Organization id")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = OrganizationResponse),
        (status = 404, description = "Not found or caller is not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    request: web::Json<AddMemberRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("➕ POST /organizations/{}/members - {}", id, claims.sub);

    match organization_service::add_member(&db, &claims.sub, &id, &request).await {
        Ok(organization) => HttpResponse::Ok().json(organization),
        Err(e) => error_response(e),
    }
}

/// Routes mounted under `/organizations`; the caller wraps them in `AuthMiddleware`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_organization))
        .route("", web::get().to(list_organizations))
        .route("/{id}", web::get().to(get_organization))
        .route("/{id}", web::put().to(update_organization))
        .route("/{id}", web::delete().to(delete_organization))
        .route("/{id}/members", web::post().to(add_member));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::AuthMiddleware;
    use crate::services::auth_service::tests::manager;
    use actix_web::{http::StatusCode, test, App};

    // Requests rejected by the middleware never reach MongoDB
    #[actix_web::test]
    async fn test_organizations_require_bearer_token() {
        let sessions = web::Data::new(manager());
        let app = test::init_service(
            App::new()
                .app_data(sessions.clone())
                .service(
                    web::scope("/organizations")
                        .wrap(AuthMiddleware)
                        .configure(configure),
                ),
        )
        .await;

        let req = test::TestRequest::get().uri("/organizations").to_request();
        let err = match test::try_call_service(&app, req).await {
            Ok(_) => panic!("unauthenticated request must be rejected"),
            Err(e) => e,
        };
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri("/organizations/000000000000000000000000")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let err = match test::try_call_service(&app, req).await {
            Ok(_) => panic!("invalid token must be rejected"),
            Err(e) => e,
        };
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }
}
