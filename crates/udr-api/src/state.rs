//! Shared application state

use std::path::PathBuf;
use std::sync::Arc;

use udr_core::{
    config::GeneratorConfig,
    traits::{CallRecordRepository, SubscriberRepository},
};
use udr_services::{CdrGenerator, CdrReportExporter, UsageReportService};

/// Call record store as seen by the handlers
pub type RecordStore = dyn CallRecordRepository;

/// Subscriber store as seen by the handlers
pub type SubscriberStore = dyn SubscriberRepository;

/// Services shared by every worker, registered as `web::Data<AppState>`
pub struct AppState {
    /// Call record store
    pub records: Arc<RecordStore>,
    /// Usage data reports
    pub usage: UsageReportService<RecordStore>,
    /// Synthetic CDR generation
    pub generator: CdrGenerator<RecordStore, SubscriberStore>,
    /// CSV report export
    pub exporter: CdrReportExporter<RecordStore>,
}

impl AppState {
    /// Wire the services over the given stores
    pub fn new(
        records: Arc<RecordStore>,
        subscribers: Arc<SubscriberStore>,
        generator: GeneratorConfig,
        reports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            usage: UsageReportService::new(records.clone()),
            generator: CdrGenerator::new(records.clone(), subscribers, generator),
            exporter: CdrReportExporter::new(records.clone(), reports_dir),
            records,
        }
    }
}
