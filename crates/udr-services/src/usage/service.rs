//! Usage report service
//!
//! Resolves the record set for a query against the call record store and
//! hands it to the aggregator.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use udr_core::{
    models::{BillingMonth, Msisdn, Period, UsageSummary},
    traits::CallRecordRepository,
    AppResult,
};

use super::aggregator;

/// Usage data reports over a call record store
pub struct UsageReportService<R: CallRecordRepository + ?Sized> {
    records: Arc<R>,
}

impl<R: CallRecordRepository + ?Sized> UsageReportService<R> {
    /// Create a new usage report service
    pub fn new(records: Arc<R>) -> Self {
        Self { records }
    }

    /// Usage of one subscriber, for one month or for all time
    ///
    /// The MSISDN is validated before the store is queried.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidIdentifier` if `msisdn` is not 11 characters long
    /// - `AppError::NoData` if the subscriber has no records in the period
    #[instrument(skip(self), fields(period = %period))]
    pub async fn usage_by_subscriber(
        &self,
        msisdn: &str,
        period: Period,
    ) -> AppResult<UsageSummary> {
        let msisdn = Msisdn::parse(msisdn)?;

        let records = match period.window() {
            Some((start, end)) => {
                self.records
                    .find_by_participant_and_range(msisdn.as_str(), start, end)
                    .await?
            }
            None => self.records.find_by_participant(msisdn.as_str()).await?,
        };
        debug!("Fetched {} call records for {}", records.len(), msisdn);

        let summary = aggregator::summarize_subscriber(msisdn.as_str(), &records)?;

        info!(
            incoming = %summary.incoming,
            outgoing = %summary.outgoing,
            "Usage report built for {}",
            msisdn
        );
        Ok(summary)
    }

    /// Usage of every subscriber with a call started in `month`
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoData` if no call started in the month.
    #[instrument(skip(self), fields(month = %month))]
    pub async fn usage_for_month(&self, month: BillingMonth) -> AppResult<Vec<UsageSummary>> {
        let (start, end) = month.window();

        let records = self.records.find_all_in_range(start, end).await?;
        debug!("Fetched {} call records for {}", records.len(), month);

        let summaries = aggregator::summarize_all(&records)?;

        info!(
            "Usage reports built for {} subscribers in {}",
            summaries.len(),
            month
        );
        Ok(summaries)
    }
}
