//! Form drafts for the two submission screens and their field schemas.
//!
//! A draft holds raw UI input as strings. It is bound to a [`FormValidation`]
//! through [`FormData`], and only turned into a typed record once the form passed
//! [`FormValidation::validate_all`].

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::record_model::{
    parse_display_date, parse_token, ChecklistAnswer, ChecklistResponse, IncidentReport,
    InspectionRecord, InspectionType, RecordStatus, ReportType, RiskLevel,
};
use crate::validation::{FieldSchema, FormData, FormValidation, ValidationRule};

pub const DESCRIPTION_MIN_LENGTH: usize = 10;
pub const DESCRIPTION_MAX_LENGTH: usize = 2000;
pub const LOCATION_MAX_LENGTH: usize = 120;

/// Raw input of the "report an occurrence" screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportDraft {
    #[serde(rename = "type")]
    pub report_type: String,
    pub location: String,
    pub description: String,
    pub risk_level: String,
    pub date: String,
}

impl ReportDraft {
    /// Empty draft dated `now`, the way the screen pre-fills its date input.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            date: now.format("%Y-%m-%dT%H:%M").to_string(),
            ..Self::default()
        }
    }

    /// Builds the record to persist. Call only after the form validated.
    pub fn to_record(
        &self,
        protocol: String,
        submitted_at: DateTime<Utc>,
    ) -> Result<IncidentReport, DraftError> {
        let report_type: ReportType = self
            .report_type
            .parse()
            .map_err(|_| DraftError::UnknownValue("type", self.report_type.clone()))?;
        let risk_level = match self.risk_level.trim() {
            "" => None,
            level => Some(
                level
                    .parse::<RiskLevel>()
                    .map_err(|_| DraftError::UnknownValue("riskLevel", level.to_string()))?,
            ),
        };

        Ok(IncidentReport {
            id: protocol,
            report_type,
            title: report_type.label().to_string(),
            description: self.description.trim().to_string(),
            location: non_blank(&self.location),
            risk_level,
            date: self.date.trim().to_string(),
            status: RecordStatus::Pendente,
            submitted_at: Some(submitted_at),
        })
    }
}

impl FormData for ReportDraft {
    fn field(&self, name: &str) -> JsonValue {
        match name {
            "type" => JsonValue::String(self.report_type.clone()),
            "location" => JsonValue::String(self.location.clone()),
            "description" => JsonValue::String(self.description.clone()),
            "riskLevel" => JsonValue::String(self.risk_level.clone()),
            "date" => JsonValue::String(self.date.clone()),
            _ => JsonValue::Null,
        }
    }

    fn set_field(&mut self, name: &str, value: JsonValue) {
        let slot = match name {
            "type" => &mut self.report_type,
            "location" => &mut self.location,
            "description" => &mut self.description,
            "riskLevel" => &mut self.risk_level,
            "date" => &mut self.date,
            _ => return,
        };
        *slot = as_text(value);
    }
}

pub fn report_schema() -> FieldSchema {
    FieldSchema::new()
        .field(
            "type",
            ValidationRule::new().required().custom(check_report_type),
        )
        .field(
            "description",
            ValidationRule::new()
                .required()
                .min_length(DESCRIPTION_MIN_LENGTH)
                .max_length(DESCRIPTION_MAX_LENGTH),
        )
        .field(
            "location",
            ValidationRule::new().max_length(LOCATION_MAX_LENGTH),
        )
        .field("riskLevel", ValidationRule::new().custom(check_risk_level))
        .field("date", ValidationRule::new().required().custom(check_date))
}

pub fn report_form(initial: ReportDraft) -> FormValidation<ReportDraft> {
    FormValidation::new(initial, report_schema())
}

/// Raw input of the inspection screen: chosen checklist plus answers by item index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectionDraft {
    #[serde(rename = "type")]
    pub inspection_type: String,
    pub location: String,
    pub responses: BTreeMap<usize, ItemResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse {
    #[serde(rename = "status")]
    pub answer: ChecklistAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl InspectionDraft {
    pub fn answer(&mut self, index: usize, answer: ChecklistAnswer) {
        self.responses
            .entry(index)
            .and_modify(|response| response.answer = answer)
            .or_insert(ItemResponse {
                answer,
                comment: None,
            });
    }

    /// Attaches a comment to an answered item. Unanswered items are left alone.
    pub fn comment(&mut self, index: usize, comment: impl Into<String>) {
        if let Some(response) = self.responses.get_mut(&index) {
            response.comment = Some(comment.into());
        }
    }

    /// Builds the record to persist. Every checklist item must be answered.
    pub fn to_record(
        &self,
        protocol: String,
        submitted_at: DateTime<Utc>,
    ) -> Result<InspectionRecord, DraftError> {
        let inspection_type: InspectionType = self
            .inspection_type
            .parse()
            .map_err(|_| DraftError::UnknownValue("type", self.inspection_type.clone()))?;
        let items = inspection_type.items();

        let answered = (0..items.len())
            .filter(|index| self.responses.contains_key(index))
            .count();
        if answered < items.len() {
            return Err(DraftError::IncompleteChecklist {
                answered,
                total: items.len(),
            });
        }

        let responses: Vec<ChecklistResponse> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                self.responses.get(&index).map(|response| ChecklistResponse {
                    item: item.to_string(),
                    answer: response.answer,
                    comment: response.comment.as_deref().and_then(non_blank),
                })
            })
            .collect();

        Ok(InspectionRecord {
            id: protocol,
            inspection_type,
            title: inspection_type.label().to_string(),
            location: non_blank(&self.location),
            date: submitted_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            status: RecordStatus::Concluida,
            conformity: conformity(&responses),
            responses,
            submitted_at: Some(submitted_at),
        })
    }
}

impl FormData for InspectionDraft {
    fn field(&self, name: &str) -> JsonValue {
        match name {
            "type" => JsonValue::String(self.inspection_type.clone()),
            "location" => JsonValue::String(self.location.clone()),
            "responses" => serde_json::to_value(&self.responses).unwrap_or(JsonValue::Null),
            _ => JsonValue::Null,
        }
    }

    fn set_field(&mut self, name: &str, value: JsonValue) {
        match name {
            "type" => self.inspection_type = as_text(value),
            "location" => self.location = as_text(value),
            "responses" => {
                if let Ok(responses) = serde_json::from_value(value) {
                    self.responses = responses;
                }
            }
            _ => {}
        }
    }
}

pub fn inspection_schema() -> FieldSchema {
    FieldSchema::new()
        .field(
            "type",
            ValidationRule::new().required().custom(check_inspection_type),
        )
        .field(
            "location",
            ValidationRule::new().max_length(LOCATION_MAX_LENGTH),
        )
}

pub fn inspection_form(initial: InspectionDraft) -> FormValidation<InspectionDraft> {
    FormValidation::new(initial, inspection_schema())
}

/// Share of applicable answers that are `conforme`, as a rounded percentage.
///
/// Items answered `na` are not applicable; an all-`na` checklist counts as 100.
pub fn conformity(responses: &[ChecklistResponse]) -> u8 {
    let applicable = responses
        .iter()
        .filter(|response| response.answer != ChecklistAnswer::Na)
        .count();
    if applicable == 0 {
        return 100;
    }
    let conforming = responses
        .iter()
        .filter(|response| response.answer == ChecklistAnswer::Conforme)
        .count();
    ((conforming * 100 + applicable / 2) / applicable) as u8
}

/// A validated draft that still cannot become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    UnknownValue(&'static str, String),
    IncompleteChecklist { answered: usize, total: usize },
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftError::UnknownValue(field, value) => {
                write!(f, "Unknown value '{}' for field '{}'", value, field)
            }
            DraftError::IncompleteChecklist { answered, total } => write!(
                f,
                "Inspeção incompleta: {} de {} itens respondidos",
                answered, total
            ),
        }
    }
}

impl std::error::Error for DraftError {}

fn check_report_type(value: &JsonValue) -> Option<String> {
    check_token::<ReportType>(value, "Tipo de reporte inválido")
}

fn check_inspection_type(value: &JsonValue) -> Option<String> {
    check_token::<InspectionType>(value, "Tipo de inspeção inválido")
}

fn check_risk_level(value: &JsonValue) -> Option<String> {
    check_token::<RiskLevel>(value, "Nível de risco inválido")
}

fn check_date(value: &JsonValue) -> Option<String> {
    match value.as_str().map(str::trim) {
        None | Some("") => None,
        Some(date) if parse_display_date(date).is_some() => None,
        Some(_) => Some("Data inválida".to_string()),
    }
}

// Blank values pass; `required` decides whether they are allowed.
fn check_token<T: serde::de::DeserializeOwned>(value: &JsonValue, message: &str) -> Option<String> {
    match value.as_str().map(str::trim) {
        None | Some("") => None,
        Some(token) if parse_token::<T>(token).is_some() => None,
        Some(_) => Some(message.to_string()),
    }
}

fn as_text(value: JsonValue) -> String {
    match value {
        JsonValue::String(text) => text,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
