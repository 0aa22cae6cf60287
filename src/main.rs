mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::services::{BcryptHasher, MongoCredentialStore, SessionManager, TokenCodec};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // No fallback secret: refuse to start without configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Users Service...");

    let db = match database::MongoDB::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("✅ MongoDB connected successfully");

    let sessions = SessionManager::new(
        Arc::new(MongoCredentialStore::new(&db)),
        Arc::new(BcryptHasher::new(config.bcrypt_cost)),
        TokenCodec::new(
            &config.jwt_secret,
            chrono::Duration::minutes(config.access_token_ttl_minutes),
        ),
    );

    let db_data = web::Data::new(db);
    let sessions_data = web::Data::new(sessions);
    let bind_address = config.bind_address();

    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    HttpServer::new(move || {
        let cors = config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(sessions_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .route("/health", web::get().to(api::health::health_check))
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Users
            .route("/users/register", web::post().to(api::auth::register))
            .route("/users/signin", web::post().to(api::auth::signin))
            .route("/refresh-token", web::post().to(api::auth::refresh_token))
            .service(
                web::resource("/users/me")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route(web::get().to(api::auth::me))
            )
            // Organizations - Requires JWT
            .service(
                web::scope("/organizations")
                    .wrap(middleware::auth::AuthMiddleware)
                    .configure(api::organizations::configure)
            )
    })
    .bind(bind_address.as_str())?
    .run()
    .await
}
