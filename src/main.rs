//! UDR Billing Server
//!
//! Serves usage data reports (incoming and outgoing talk time per
//! subscriber) computed from stored call detail records, together with
//! CDR listing, synthetic generation and CSV report export.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use udr_api::state::{RecordStore, SubscriberStore};
use udr_api::{configure_routes, query_config, AppState};
use udr_core::config::{AppConfig, StorageBackend};
use udr_db::{
    create_pool, run_migrations, InMemoryCallRecordRepository, InMemorySubscriberRepository,
    PgCallRecordRepository, PgSubscriberRepository,
};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "udr_billing={},udr_api={},udr_services={},udr_db={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Open the configured call record and subscriber stores
async fn open_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<RecordStore>, Arc<SubscriberStore>)> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage, records are lost on restart");
            let records: Arc<RecordStore> = Arc::new(InMemoryCallRecordRepository::new());
            let subscribers: Arc<SubscriberStore> = Arc::new(InMemorySubscriberRepository::new());
            Ok((records, subscribers))
        }
        StorageBackend::Postgres => {
            let database_url = config.database.url.as_deref().context(
                "database.url must be set for the postgres backend (UDR__DATABASE__URL)",
            )?;

            info!("Connecting to database...");
            let pool = create_pool(database_url, Some(config.database.max_connections))
                .await
                .context("Failed to create database pool")?;
            run_migrations(&pool)
                .await
                .context("Failed to apply database migrations")?;

            info!(
                "Database connection established with {} max connections",
                config.database.max_connections
            );

            let records: Arc<RecordStore> = Arc::new(PgCallRecordRepository::new(pool.clone()));
            let subscribers: Arc<SubscriberStore> = Arc::new(PgSubscriberRepository::new(pool));
            Ok((records, subscribers))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting UDR Billing v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load configuration")?;

    let (records, subscribers) = open_stores(&config).await?;

    let state = web::Data::new(AppState::new(
        records,
        subscribers,
        config.generator.clone(),
        config.reports.directory.clone(),
    ));

    if config.generator.regenerate_on_startup {
        let summary = state
            .generator
            .reset_and_generate()
            .await
            .context("Failed to generate call records on startup")?;
        info!(
            "Generated {} call records for {} subscribers ({} to {})",
            summary.records, summary.subscribers, summary.from, summary.to
        );
    }

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    let cors_origins = config.server.cors_origin_list();

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        let allowed = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|origin| allowed.iter().any(|o| o == origin))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(query_config())
            // Middleware
            .wrap(cors)
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            // Configure routes
            .configure(configure_routes)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
