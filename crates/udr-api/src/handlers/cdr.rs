//! CDR API handlers
//!
//! Listing and retrieval of stored call detail records, synthetic
//! generation and per-subscriber CSV report export.

use crate::dto::{ApiResponse, CdrResponse, PaginationParams, ReportParams, ReportResponse};
use crate::state::AppState;
use actix_web::{
    web::{self, Data, Json, Path, Query},
    Result,
};
use tracing::{debug, info, instrument, warn};
use udr_core::{
    error::AppError,
    models::ReportRange,
    traits::{PaginatedResponse, Repository},
};
use udr_services::GenerationSummary;
use validator::Validate;

/// List stored CDRs with pagination
///
/// # Errors
///
/// Returns 400 on invalid pagination, 404 `no_data` when the store is empty.
///
/// # Examples
///
/// ```text
/// GET /api/v1/cdr?page=1&per_page=50
/// ```
#[instrument(skip(state, query))]
pub async fn list_cdrs(
    query: Query<PaginationParams>,
    state: Data<AppState>,
) -> Result<Json<PaginatedResponse<CdrResponse>>> {
    if let Err(e) = query.validate() {
        warn!("Invalid query parameters: {}", e);
        return Err(AppError::from(e).into());
    }

    debug!("Listing CDRs: page={}, per_page={}", query.page, query.per_page);

    let (records, total) = futures::try_join!(
        state.records.find_all(query.limit(), query.offset()),
        state.records.count(),
    )?;

    if total == 0 {
        return Err(AppError::NoData.into());
    }

    let data: Vec<CdrResponse> = records.into_iter().map(CdrResponse::from).collect();

    info!("Retrieved {} CDRs out of {} total", data.len(), total);

    Ok(Json(query.paginate(data, total)))
}

/// Get a single CDR by ID
///
/// # Errors
///
/// Returns 404 if the CDR does not exist.
///
/// # Examples
///
/// ```text
/// GET /api/v1/cdr/12345
/// ```
#[instrument(skip(state))]
pub async fn get_cdr(
    path: Path<i64>,
    state: Data<AppState>,
) -> Result<Json<ApiResponse<CdrResponse>>> {
    let cdr_id = path.into_inner();
    debug!("Fetching CDR with id: {}", cdr_id);

    let record = state
        .records
        .find_by_id(cdr_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CDR with id {} not found", cdr_id)))?;

    Ok(Json(ApiResponse::success(CdrResponse::from(record))))
}

/// Generate another period of synthetic CDRs
///
/// # Examples
///
/// ```text
/// POST /api/v1/cdr/generate
/// ```
#[instrument(skip(state))]
pub async fn generate_cdrs(
    state: Data<AppState>,
) -> Result<Json<ApiResponse<GenerationSummary>>> {
    let summary = state.generator.generate().await?;

    Ok(Json(ApiResponse::with_message(summary, "Call records generated")))
}

/// Write a CSV report of one subscriber's CDRs
///
/// # Errors
///
/// Returns 400 for a malformed MSISDN or date, 404 `no_data` when the
/// subscriber has no calls in the range.
///
/// # Examples
///
/// ```text
/// POST /api/v1/cdr/report?msisdn=71111111111&start=2023-10-01&end=2023-10-31
/// ```
#[instrument(skip(state, query), fields(msisdn = %query.msisdn))]
pub async fn generate_report(
    query: Query<ReportParams>,
    state: Data<AppState>,
) -> Result<Json<ApiResponse<ReportResponse>>> {
    let range = ReportRange::parse(&query.start, &query.end)?;

    let receipt = state.exporter.export(&query.msisdn, range).await?;
    let message = format!("Report generated. UUID: {}", receipt.report_id);

    Ok(Json(ApiResponse::with_message(
        ReportResponse::from(receipt),
        message,
    )))
}

/// Configure CDR routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cdr")
            .route("", web::get().to(list_cdrs))
            .route("/generate", web::post().to(generate_cdrs))
            .route("/report", web::post().to(generate_report))
            .route("/{id}", web::get().to(get_cdr)),
    );
}
