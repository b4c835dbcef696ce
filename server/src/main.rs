use actix_web::{web, App, HttpServer, middleware::Logger};
use actix_cors::Cors;
use dotenv::dotenv;
use std::net::TcpListener;
use std::sync::Arc;

use token_exchange_server::config;
use token_exchange_server::db::create_pool;
use token_exchange_server::handlers;
use token_exchange_server::routes::{configure_auth_routes, configure_health_routes};
use token_exchange_server::services::auth::{AuthenticationService, FirebaseTokenVerifier, SessionTokenIssuer};
use token_exchange_server::services::health_indicator::HealthIndicator;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings
    let app_settings = match config::init_config() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    let issuer = match SessionTokenIssuer::from_settings(&app_settings.auth) {
        Ok(issuer) => Arc::new(issuer),
        Err(e) => {
            log::error!("Failed to initialize session token issuer: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Session token issuer initialized ({}s expiration)", issuer.expires_in_seconds());

    let verifier = match FirebaseTokenVerifier::new(&app_settings.firebase) {
        Ok(verifier) => verifier,
        Err(e) => {
            log::error!("Failed to initialize Firebase token verifier: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Firebase token verifier initialized for project {}", app_settings.firebase.project_id);

    let auth_service = web::Data::new(AuthenticationService::new(
        Arc::new(verifier),
        issuer.clone(),
        app_settings.auth.max_id_token_length,
    ));

    // The server starts without a database; the health endpoint reports it
    let db_pool = match app_settings.database.url.as_deref() {
        Some(url) => match create_pool(url) {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::error!("Failed to create database connection pool: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("DATABASE_URL not set, database health will be reported as UNKNOWN");
            None
        }
    };
    let health_indicator = web::Data::new(HealthIndicator::new(&app_settings.app.name, db_pool));

    let issuer_data = web::Data::from(issuer);

    // Get server host and port from settings
    let host = &app_settings.server.host;
    let port = app_settings.server.port;

    log::info!("Starting {} ({}) at http://{}:{}", app_settings.app.name, app_settings.app.environment, host, port);

    let server_addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(server_addr)?;

    HttpServer::new(move || {
        let app_settings = app_settings.clone();

        // Configure CORS using actix-cors
        let mut cors = Cors::default();

        if app_settings.server.cors_origins.iter().any(|origin| origin == "*") {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        cors = cors
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(app_settings))
            .app_data(auth_service.clone())
            .app_data(issuer_data.clone())
            .app_data(health_indicator.clone())
            // Liveness probe
            .service(
                web::resource("/health")
                    .route(web::get().to(handlers::health::health_check))
            )
            .service(
                web::scope("/api")
                    .configure(configure_health_routes)
                    .configure(configure_auth_routes)
            )
    })
    .listen(listener)?
    .run()
    .await
}
