//! Synthetic CDR generation
//!
//! Produces months of random call traffic between the subscribers of a
//! small pool. A run starts on the calendar day of the latest stored call's
//! end, so consecutive runs share that day and each adds calls to it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};
use parking_lot::Mutex;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, instrument};
use udr_core::{
    config::GeneratorConfig,
    models::{CallRecord, CallType},
    traits::{CallRecordRepository, SubscriberRepository},
    AppError, AppResult,
};

use crate::constants::{
    EARLIEST_START_YEAR, LATEST_START_YEAR, MSISDN_PREFIX, MSISDN_RANDOM_DIGITS, SECONDS_PER_DAY,
};

/// Outcome of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// Size of the subscriber pool the calls were drawn from
    pub subscribers: usize,

    /// Records written to the store
    pub records: usize,

    /// First generated day
    pub from: NaiveDate,

    /// Day after the last generated day
    pub to: NaiveDate,
}

/// CDR generator
pub struct CdrGenerator<C, S>
where
    C: CallRecordRepository + ?Sized,
    S: SubscriberRepository + ?Sized,
{
    records: Arc<C>,
    subscribers: Arc<S>,
    config: GeneratorConfig,
    rng: Mutex<StdRng>,
}

impl<C, S> CdrGenerator<C, S>
where
    C: CallRecordRepository + ?Sized,
    S: SubscriberRepository + ?Sized,
{
    /// Create a generator seeded from OS entropy
    pub fn new(records: Arc<C>, subscribers: Arc<S>, config: GeneratorConfig) -> Self {
        Self::with_rng(records, subscribers, config, StdRng::from_entropy())
    }

    /// Create a generator with an explicit random source
    pub fn with_rng(
        records: Arc<C>,
        subscribers: Arc<S>,
        config: GeneratorConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            records,
            subscribers,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Wipe the call record store, then generate a fresh period
    ///
    /// The subscriber pool is kept.
    #[instrument(skip(self))]
    pub async fn reset_and_generate(&self) -> AppResult<GenerationSummary> {
        let removed = self.records.delete_all().await?;
        info!("Removed {} existing call records", removed);

        self.generate().await
    }

    /// Generate `config.months` months of traffic and store it
    ///
    /// Starts on the day of the latest stored `end_time`, or on a random
    /// date between 1980 and 2024 when the store is empty.
    #[instrument(skip(self))]
    pub async fn generate(&self) -> AppResult<GenerationSummary> {
        self.validate_config()?;

        let pool = self.subscriber_pool().await?;
        if pool.len() < 2 {
            return Err(AppError::InvalidInput(format!(
                "at least two subscribers are needed to generate calls, found {}",
                pool.len()
            )));
        }

        let from = match self.records.find_latest_end_time().await? {
            Some(latest) => latest.date_naive(),
            None => self.random_start_date()?,
        };
        let to = from
            .checked_add_months(Months::new(self.config.months))
            .ok_or_else(|| {
                AppError::InvalidInput(format!("generation period from {} overflows", from))
            })?;

        let generated = self.build_records(&pool, from, to)?;
        debug!("Generated {} call records from {} to {}", generated.len(), from, to);

        let mut stored = 0;
        for batch in generated.chunks(self.config.batch_size.max(1)) {
            stored += self.records.create_batch(batch).await?;
        }

        info!(
            subscribers = pool.len(),
            records = stored,
            "Generated call records from {} to {}",
            from,
            to
        );

        Ok(GenerationSummary {
            subscribers: pool.len(),
            records: stored,
            from,
            to,
        })
    }

    fn validate_config(&self) -> AppResult<()> {
        let config = &self.config;

        if config.min_call_secs >= config.max_call_secs {
            return Err(AppError::Config(format!(
                "generator.min_call_secs ({}) must be below generator.max_call_secs ({})",
                config.min_call_secs, config.max_call_secs
            )));
        }
        if config.max_calls_per_day < 2 {
            return Err(AppError::Config(
                "generator.max_calls_per_day must be at least 2".to_string(),
            ));
        }
        if config.months == 0 {
            return Err(AppError::Config("generator.months must be positive".to_string()));
        }

        Ok(())
    }

    /// Stored subscriber MSISDNs, creating the pool on first use
    async fn subscriber_pool(&self) -> AppResult<Vec<String>> {
        let existing = self.subscribers.list_all().await?;
        if !existing.is_empty() {
            return Ok(existing.into_iter().map(|s| s.msisdn).collect());
        }

        let msisdns = {
            let mut rng = self.rng.lock();
            random_msisdns(&mut *rng, self.config.subscriber_count)
        };
        let created = self.subscribers.create_batch(&msisdns).await?;
        info!("Created {} subscribers", created.len());

        Ok(created.into_iter().map(|s| s.msisdn).collect())
    }

    fn random_start_date(&self) -> AppResult<NaiveDate> {
        let earliest = NaiveDate::from_ymd_opt(EARLIEST_START_YEAR, 1, 1);
        let latest = NaiveDate::from_ymd_opt(LATEST_START_YEAR, 12, 31);

        let (earliest, latest) = earliest
            .zip(latest)
            .ok_or_else(|| AppError::Internal("invalid generation start bounds".to_string()))?;

        let span = (latest - earliest).num_days() as u64;
        let offset = self.rng.lock().gen_range(0..=span);

        earliest
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| AppError::Internal("generation start date out of range".to_string()))
    }

    /// Build the calls of every day in `[from, to)`
    fn build_records(
        &self,
        pool: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<CallRecord>> {
        let config = &self.config;
        let mut rng = self.rng.lock();
        let mut records = Vec::new();

        for day in from.iter_days().take_while(|day| *day < to) {
            let midnight = day.and_time(NaiveTime::MIN).and_utc();
            let calls_today = rng.gen_range(1..config.max_calls_per_day);

            for _ in 0..calls_today {
                let (caller, receiver) = pick_pair(&mut *rng, pool)?;

                let offset = rng.gen_range(0..SECONDS_PER_DAY);
                let length = rng.gen_range(config.min_call_secs..config.max_call_secs);
                let start: DateTime<Utc> = midnight + chrono::Duration::seconds(i64::from(offset));
                let end = start + chrono::Duration::seconds(i64::from(length));

                let call_type = if rng.gen_bool(0.5) {
                    CallType::Outgoing
                } else {
                    CallType::Incoming
                };

                records.push(CallRecord::new(call_type, caller, receiver, start, end));
            }
        }

        Ok(records)
    }
}

/// `count` distinct MSISDNs of the form `7` followed by ten random digits
fn random_msisdns<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(count);
    let mut msisdns = Vec::with_capacity(count);

    while msisdns.len() < count {
        let mut msisdn = String::with_capacity(MSISDN_RANDOM_DIGITS + 1);
        msisdn.push(MSISDN_PREFIX);
        for _ in 0..MSISDN_RANDOM_DIGITS {
            msisdn.push(char::from(b'0' + rng.gen_range(0..10u8)));
        }

        if seen.insert(msisdn.clone()) {
            msisdns.push(msisdn);
        }
    }

    msisdns
}

/// Two different subscribers from the pool
fn pick_pair<'a, R: Rng + ?Sized>(
    rng: &mut R,
    pool: &'a [String],
) -> AppResult<(&'a str, &'a str)> {
    let mut picked = pool.choose_multiple(rng, 2);

    match (picked.next(), picked.next()) {
        (Some(caller), Some(receiver)) if caller != receiver => {
            Ok((caller.as_str(), receiver.as_str()))
        }
        (Some(caller), Some(_)) => {
            // Duplicate MSISDNs in the stored pool; fall back to the first other one
            let receiver = pool
                .iter()
                .find(|candidate| *candidate != caller)
                .ok_or_else(|| {
                    AppError::InvalidInput("subscriber pool has a single MSISDN".to_string())
                })?;
            Ok((caller.as_str(), receiver.as_str()))
        }
        _ => Err(AppError::InvalidInput("subscriber pool too small".to_string())),
    }
}
