use actix_web::{web, HttpResponse, ResponseError};

use crate::api::metrics;
use crate::models::PublicUser;
use crate::services::auth_service::{RefreshTokenRequest, RegisterRequest, SignInRequest, TokenResponse};
use crate::services::{Claims, SessionManager};
use crate::utils::AuthFailure;

fn failure_response(context: &str, e: &AuthFailure) -> HttpResponse {
    if e.is_internal() {
        log::error!("❌ {} failed: {}", context, e);
    } else {
        log::warn!("❌ {} failed: {}", context, e);
    }
    e.error_response()
}

#[utoipa::path(
    post,
    path = "/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = PublicUser),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    sessions: web::Data<SessionManager>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /users/register - email: {}", request.email);

    match sessions.register(&request).await {
        Ok(user) => {
            metrics::increment_registrations();
            HttpResponse::Created().json(user)
        }
        Err(e) => failure_response("Registration", &e),
    }
}

#[utoipa::path(
    post,
    path = "/users/signin",
    tag = "Users",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn signin(
    sessions: web::Data<SessionManager>,
    request: web::Json<SignInRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /users/signin - email: {}", request.email);

    match sessions.authenticate(&request.email, &request.password).await {
        Ok(tokens) => {
            metrics::increment_signins();
            log::info!("✅ Sign-in successful: {}", request.email);
            HttpResponse::Ok().json(TokenResponse::from(tokens))
        }
        Err(e) => {
            metrics::increment_auth_failures();
            failure_response("Sign-in", &e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/refresh-token",
    tag = "Users",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token issued", body = TokenResponse),
        (status = 401, description = "Refresh token not found or invalid")
    )
)]
pub async fn refresh_token(
    sessions: web::Data<SessionManager>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse {
    log::info!("🔄 POST /refresh-token");

    match sessions.refresh(&request.refresh_token).await {
        Ok(tokens) => {
            metrics::increment_refreshes();
            HttpResponse::Ok().json(TokenResponse::from(tokens))
        }
        Err(e) => {
            metrics::increment_auth_failures();
            failure_response("Token refresh", &e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    claims: web::ReqData<Claims>,
    sessions: web::Data<SessionManager>,
) -> HttpResponse {
    log::info!("👤 GET /users/me - {}", claims.sub);

    match sessions.current_user(&claims).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => failure_response("Current user lookup", &e),
    }
}
