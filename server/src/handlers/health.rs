use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::config::AppSettings;
use crate::services::health_indicator::{HealthIndicator, HealthState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    version: String,
}

pub async fn health_check() -> impl Responder {
    // Public liveness endpoint - only return basic status, no sensitive metrics
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    HttpResponse::Ok().json(response)
}

/// Detailed health report; 503 when any required component is down
pub async fn custom_health(indicator: web::Data<HealthIndicator>) -> impl Responder {
    let report = indicator.health_status().await;

    if report.status == HealthState::Down {
        HttpResponse::ServiceUnavailable().json(report)
    } else {
        HttpResponse::Ok().json(report)
    }
}

pub async fn health_info(settings: web::Data<AppSettings>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "application": settings.app.name,
        "environment": settings.app.environment,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Firebase ID token exchange service with health monitoring",
        "liveness": "Available at /health",
        "customHealth": "Available at /api/health/custom"
    }))
}
