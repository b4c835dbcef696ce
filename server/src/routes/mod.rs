use actix_web::{error::InternalError, web, HttpResponse};
use crate::handlers::auth::firebase_handlers;
use crate::handlers::health;
use crate::models::auth_outcome::{AuthErrorCode, AuthOutcome};

/// Token exchange routes, mounted under the "/api" scope in main.rs.
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/auth") // Base path: /api/v1/auth
            .app_data(json_config())
            .service(firebase_handlers::verify_firebase_token)
            .service(firebase_handlers::auth_status)
            .service(firebase_handlers::validate_session_token)
    );
}

/// Health routes, mounted under the "/api" scope in main.rs.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/health") // Base path: /api/health
            .route("/custom", web::get().to(health::custom_health))
            .route("/info", web::get().to(health::health_info))
    );
}

// Unparseable bodies get the same failure shape as every other exchange error
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            log::debug!("Rejected token exchange body: {}", err);
            let response = HttpResponse::BadRequest().json(AuthOutcome::failure(
                AuthErrorCode::InvalidRequest,
                "Request body must be JSON with an idToken field",
            ));
            InternalError::from_response(err, response).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::authentication_service::tests::{claims_u1, issuer, StubVerifier};
    use crate::services::auth::AuthenticationService;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_oversized_body_is_invalid_request() {
        let stub = StubVerifier::returning(Ok(claims_u1()));
        let service = AuthenticationService::new(stub.clone(), issuer(3600), 5000);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .service(web::scope("/api").configure(configure_auth_routes)),
        )
        .await;

        let payload = format!("{{\"idToken\":\"{}\"}}", "a".repeat(70 * 1024));
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/verify")
            .insert_header(("content-type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "INVALID_REQUEST");
        assert_eq!(stub.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let app = test::init_service(
            App::new().service(web::scope("/api").configure(configure_auth_routes)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/auth/missing").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
