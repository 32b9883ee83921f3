//! Route table and extractor configuration

use actix_web::{error::InternalError, web, HttpResponse};

use crate::handlers::{configure_cdr, configure_udr, health_check};

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))
            // Call detail records
            .configure(configure_cdr)
            // Usage data reports
            .configure(configure_udr),
    );
}

/// Query extractor answering malformed query strings with 400 `invalid_query`
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let error_message = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_query",
                "message": error_message,
                "status": 400
            })),
        )
        .into()
    })
}
