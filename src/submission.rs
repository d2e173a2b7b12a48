//! Submit path of the two forms and the matching history queries.
//!
//! A submission runs the full-form validation gate, assigns a protocol
//! identifier, waits once for the simulated backend, prepends the record to its
//! collection and resets the form. A failure leaves the form untouched so the user
//! can retry. There is no retry or deduplication here.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::baseline::{sample_inspections, sample_reports};
use crate::config::CoreConfig;
use crate::connectivity::Connectivity;
use crate::forms::{DraftError, InspectionDraft, ReportDraft};
use crate::query::load_history;
use crate::record_model::{IncidentReport, InspectionRecord, RecordKind, StatusFilter};
use crate::slot_store::{LocalStore, SlotStorage};
use crate::validation::FormValidation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Field name to message, as left in the form's error state.
    Invalid(BTreeMap<String, String>),
    Draft(DraftError),
    Offline,
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Invalid(errors) => {
                write!(f, "{} campo(s) com erro", errors.len())
            }
            SubmitError::Draft(err) => write!(f, "{}", err),
            SubmitError::Offline => write!(f, "Sem conexão. Tente novamente."),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<DraftError> for SubmitError {
    fn from(err: DraftError) -> Self {
        SubmitError::Draft(err)
    }
}

/// `PREFIX-NNNNNN`, the last six digits of the Unix millisecond clock.
///
/// Unique enough for one local session, not globally.
pub fn protocol_id(kind: RecordKind, now: DateTime<Utc>) -> String {
    format!(
        "{}-{:06}",
        kind.protocol_prefix(),
        now.timestamp_millis().rem_euclid(1_000_000)
    )
}

pub struct Submitter<S: SlotStorage> {
    store: LocalStore<S>,
    config: CoreConfig,
    connectivity: Connectivity,
}

impl<S: SlotStorage> Submitter<S> {
    pub fn new(store: LocalStore<S>, config: CoreConfig, connectivity: Connectivity) -> Self {
        Self {
            store,
            config,
            connectivity,
        }
    }

    pub fn store(&self) -> &LocalStore<S> {
        &self.store
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub async fn submit_report(
        &self,
        form: &mut FormValidation<ReportDraft>,
    ) -> Result<IncidentReport, SubmitError> {
        self.submit_report_at(form, Utc::now()).await
    }

    /// [`submit_report`](Self::submit_report) with an explicit clock.
    pub async fn submit_report_at(
        &self,
        form: &mut FormValidation<ReportDraft>,
        now: DateTime<Utc>,
    ) -> Result<IncidentReport, SubmitError> {
        if !form.validate_all() {
            debug!("Report form rejected: {:?}", form.error_messages());
            return Err(SubmitError::Invalid(form.error_messages()));
        }

        let record = form
            .data()
            .to_record(protocol_id(RecordKind::Report, now), now)?;
        self.transmit(&record.id).await?;

        self.store
            .append(self.config.slot_key(RecordKind::Report), record.clone());
        info!("Report {} submitted", record.id);

        form.reset_form();
        Ok(record)
    }

    pub async fn submit_inspection(
        &self,
        form: &mut FormValidation<InspectionDraft>,
    ) -> Result<InspectionRecord, SubmitError> {
        self.submit_inspection_at(form, Utc::now()).await
    }

    /// [`submit_inspection`](Self::submit_inspection) with an explicit clock.
    pub async fn submit_inspection_at(
        &self,
        form: &mut FormValidation<InspectionDraft>,
        now: DateTime<Utc>,
    ) -> Result<InspectionRecord, SubmitError> {
        if !form.validate_all() {
            debug!("Inspection form rejected: {:?}", form.error_messages());
            return Err(SubmitError::Invalid(form.error_messages()));
        }

        let record = form
            .data()
            .to_record(protocol_id(RecordKind::Inspection, now), now)?;
        self.transmit(&record.id).await?;

        self.store
            .append(self.config.slot_key(RecordKind::Inspection), record.clone());
        info!(
            "Inspection {} submitted ({}% conformity)",
            record.id, record.conformity
        );

        form.reset_form();
        Ok(record)
    }

    /// Own reports plus samples, newest first, searched and filtered.
    pub fn report_history(&self, search: &str, status: StatusFilter) -> Vec<IncidentReport> {
        let baseline = if self.config.include_samples {
            sample_reports()
        } else {
            Vec::new()
        };
        load_history(
            &self.store,
            self.config.slot_key(RecordKind::Report),
            &baseline,
            search,
            status,
        )
    }

    pub fn inspection_history(&self, search: &str, status: StatusFilter) -> Vec<InspectionRecord> {
        let baseline = if self.config.include_samples {
            sample_inspections()
        } else {
            Vec::new()
        };
        load_history(
            &self.store,
            self.config.slot_key(RecordKind::Inspection),
            &baseline,
            search,
            status,
        )
    }

    /// Empties one collection. Samples still show up in listings.
    pub fn clear(&self, kind: RecordKind) -> bool {
        self.store.clear(self.config.slot_key(kind))
    }

    // Stand-in for the backend call: a single suspend point, no timeout.
    async fn transmit(&self, protocol: &str) -> Result<(), SubmitError> {
        if !self.connectivity.is_online() {
            warn!("Submission {} refused: offline", protocol);
            return Err(SubmitError::Offline);
        }

        debug!(
            "Sending {} (simulated latency {} ms)",
            protocol, self.config.submit_latency_ms
        );
        tokio::time::sleep(self.config.submit_latency()).await;
        Ok(())
    }
}
