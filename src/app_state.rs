use log::info;
use tokio::runtime::{Builder, Runtime};

use crate::app_response::AppResponse;
use crate::config::CoreConfig;
use crate::connectivity::Connectivity;
use crate::forms::{inspection_form, report_form, InspectionDraft, ReportDraft};
use crate::record_model::{IncidentReport, InspectionRecord, RecordKind, StatusFilter};
use crate::slot_store::{LmdbSlots, LocalStore};
use crate::submission::Submitter;

/// Everything one shell instance holds on to between ABI calls.
///
/// Submissions are driven to completion on a private current-thread runtime, so
/// each ABI call returns only once the record is persisted or rejected.
pub struct AppState {
    submitter: Submitter<LmdbSlots>,
    runtime: Runtime,
}

impl AppState {
    pub fn init(config: CoreConfig) -> Result<Self, AppResponse> {
        config.validate()?;

        let slots = LmdbSlots::open(&config.db_name, config.map_size)?;
        let runtime = Builder::new_current_thread().enable_time().build()?;
        let connectivity = Connectivity::new(config.start_online);

        info!("Store '{}' opened", config.db_name);
        Ok(Self {
            submitter: Submitter::new(LocalStore::new(slots), config, connectivity),
            runtime,
        })
    }

    pub fn submitter(&self) -> &Submitter<LmdbSlots> {
        &self.submitter
    }

    pub fn submit_report(&self, draft: ReportDraft) -> Result<IncidentReport, AppResponse> {
        let mut form = report_form(draft);
        self.runtime
            .block_on(self.submitter.submit_report(&mut form))
            .map_err(AppResponse::from)
    }

    pub fn submit_inspection(&self, draft: InspectionDraft) -> Result<InspectionRecord, AppResponse> {
        let mut form = inspection_form(draft);
        self.runtime
            .block_on(self.submitter.submit_inspection(&mut form))
            .map_err(AppResponse::from)
    }

    pub fn reports(&self, search: &str, status: StatusFilter) -> Vec<IncidentReport> {
        self.submitter.report_history(search, status)
    }

    pub fn inspections(&self, search: &str, status: StatusFilter) -> Vec<InspectionRecord> {
        self.submitter.inspection_history(search, status)
    }

    pub fn clear(&self, kind: RecordKind) -> bool {
        self.submitter.clear(kind)
    }

    pub fn set_online(&self, online: bool) {
        self.submitter.connectivity().set_online(online);
    }

    /// Flushes the environment to disk. The handle stays usable.
    pub fn close_database(&self) -> Result<(), AppResponse> {
        self.submitter.store().slots().sync()?;
        info!(
            "Store at {} flushed",
            self.submitter.store().slots().path().display()
        );
        Ok(())
    }
}
