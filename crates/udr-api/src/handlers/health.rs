//! Liveness endpoint

use actix_web::HttpResponse;

/// Health check endpoint
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "udr-billing",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
