//! Usage data report handlers

use crate::dto::{ApiResponse, MonthQuery, UsageQuery, UsageReportResponse};
use crate::state::AppState;
use actix_web::{
    web::{self, Data, Json, Query},
    Result,
};
use tracing::{info, instrument};
use udr_core::models::{BillingMonth, Msisdn, Period};

/// Usage data report of one subscriber
///
/// The MSISDN is checked before the month.
///
/// # Errors
///
/// 400 `invalid_identifier` or `invalid_month_format`, 404 `no_data`.
///
/// # Examples
///
/// ```text
/// GET /api/v1/udr/subscriber?msisdn=71111111111&month=2023-10
/// GET /api/v1/udr/subscriber?msisdn=71111111111
/// ```
#[instrument(skip(state))]
pub async fn usage_by_subscriber(
    query: Query<UsageQuery>,
    state: Data<AppState>,
) -> Result<Json<ApiResponse<UsageReportResponse>>> {
    let msisdn = Msisdn::parse(&query.msisdn)?;
    let period = Period::from_month_param(query.month.as_deref())?;

    let summary = state.usage.usage_by_subscriber(msisdn.as_str(), period).await?;

    Ok(Json(ApiResponse::success(summary.into())))
}

/// Usage data reports of every subscriber active in a month
///
/// # Errors
///
/// 400 `invalid_month_format`, 404 `no_data`.
///
/// # Examples
///
/// ```text
/// GET /api/v1/udr/month?month=2023-10
/// ```
#[instrument(skip(state))]
pub async fn usage_for_month(
    query: Query<MonthQuery>,
    state: Data<AppState>,
) -> Result<Json<ApiResponse<Vec<UsageReportResponse>>>> {
    let month = BillingMonth::parse(query.month.trim())?;

    let reports: Vec<UsageReportResponse> = state
        .usage
        .usage_for_month(month)
        .await?
        .into_iter()
        .map(UsageReportResponse::from)
        .collect();

    info!("Returning {} usage reports for {}", reports.len(), month);

    Ok(Json(ApiResponse::success(reports)))
}

/// Configure usage data report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/udr")
            .route("/subscriber", web::get().to(usage_by_subscriber))
            .route("/month", web::get().to(usage_for_month)),
    );
}
