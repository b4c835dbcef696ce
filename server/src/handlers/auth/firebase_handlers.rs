use actix_web::{get, http::StatusCode, post, web, HttpRequest, HttpResponse, Responder};
use log::{debug, info};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::auth_outcome::{AuthErrorCode, AuthOutcome};
use crate::models::authenticated_user::AuthenticatedUser;
use crate::services::auth::AuthenticationService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuthRequest {
    /// Missing is treated like empty and rejected as INVALID_REQUEST
    #[serde(default)]
    pub id_token: String,
}

pub fn outcome_status(outcome: &AuthOutcome) -> StatusCode {
    match outcome.error_code() {
        None => StatusCode::OK,
        Some(AuthErrorCode::InvalidRequest) | Some(AuthErrorCode::InvalidToken) => StatusCode::BAD_REQUEST,
        Some(AuthErrorCode::VerificationFailed) => StatusCode::UNAUTHORIZED,
        Some(AuthErrorCode::InternalError) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Exchange a Firebase ID token for a session token
#[post("/verify")]
pub async fn verify_firebase_token(
    req: HttpRequest,
    auth_service: web::Data<AuthenticationService>,
    token_request: web::Json<TokenAuthRequest>,
) -> impl Responder {
    debug!("Received Firebase token exchange request");

    let client_ip = req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    info!("Firebase authentication attempt from IP: {}", client_ip);

    let outcome = auth_service.authenticate(&token_request.id_token).await;

    HttpResponse::build(outcome_status(&outcome)).json(outcome)
}

/// Current exchange configuration
#[get("/status")]
pub async fn auth_status(auth_service: web::Data<AuthenticationService>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ACTIVE",
        "provider": "Firebase",
        "jwtExpiration": auth_service.expires_in_seconds(),
        "features": ["token_verification", "jwt_generation", "token_validation"]
    }))
}

/// Validate the session token from the Authorization header
#[get("/validate")]
pub async fn validate_session_token(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    debug!("Session token validated for user {}", user.uid);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "valid": true,
        "user": user
    })))
}
