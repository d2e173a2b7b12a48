//! Runtime configuration of the core, supplied by the shell as JSON.
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```rust
//! use ehs_report_core::config::CoreConfig;
//!
//! let config = CoreConfig::from_json(r#"{"dbName": "ehs_test", "submitLatencyMs": 0}"#).unwrap();
//! assert_eq!(config.db_name, "ehs_test");
//! assert_eq!(config.reports_key, "ehs-reports");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::record_model::RecordKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    /// LMDB environment name; the directory is `<db_name>.lmdb`.
    pub db_name: String,
    /// Maximum size of the LMDB map in bytes.
    pub map_size: usize,
    pub reports_key: String,
    pub inspections_key: String,
    /// Simulated backend latency before a submission is persisted.
    pub submit_latency_ms: u64,
    /// Merge the sample records into history listings.
    pub include_samples: bool,
    pub start_online: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_name: "ehs_reports".to_string(),
            map_size: 10 * 1024 * 1024,
            reports_key: "ehs-reports".to_string(),
            inspections_key: "ehs-inspections".to_string(),
            submit_latency_ms: 1500,
            include_samples: true,
            start_online: true,
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let config: CoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if self.db_name.trim().is_empty() {
            return Err(AppResponse::BadRequest("dbName cannot be empty".to_string()));
        }
        if self.reports_key.is_empty() || self.inspections_key.is_empty() {
            return Err(AppResponse::BadRequest("Slot keys cannot be empty".to_string()));
        }
        if self.reports_key == self.inspections_key {
            return Err(AppResponse::BadRequest(
                "Reports and inspections need distinct slot keys".to_string(),
            ));
        }
        if self.map_size == 0 {
            return Err(AppResponse::BadRequest("mapSize must be positive".to_string()));
        }
        Ok(())
    }

    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    pub fn slot_key(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Report => &self.reports_key,
            RecordKind::Inspection => &self.inspections_key,
        }
    }
}
