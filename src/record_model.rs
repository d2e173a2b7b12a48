//! Submitted records and the closed value sets they are built from.
//!
//! Two record kinds are stored: [`IncidentReport`] (incidents, near misses, unsafe
//! conditions, behavioral observations) and [`InspectionRecord`] (completed
//! checklists). Both serialize with camelCase keys so the persisted JSON matches
//! what the UI shell renders.
//!
//! # Examples
//!
//! ```rust
//! use ehs_report_core::record_model::{RecordStatus, StatusFilter};
//!
//! let filter: StatusFilter = "em-analise".parse().unwrap();
//! assert!(filter.matches(RecordStatus::EmAnalise));
//! assert!(!filter.matches(RecordStatus::Resolvido));
//! assert!("all".parse::<StatusFilter>().unwrap().matches(RecordStatus::Resolvido));
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Workflow status shared by both record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    Pendente,
    EmAnalise,
    Resolvido,
    Concluida,
    PendenteRevisao,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pendente => "pendente",
            RecordStatus::EmAnalise => "em-analise",
            RecordStatus::Resolvido => "resolvido",
            RecordStatus::Concluida => "concluida",
            RecordStatus::PendenteRevisao => "pendente-revisao",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Pendente => "Pendente",
            RecordStatus::EmAnalise => "Em Análise",
            RecordStatus::Resolvido => "Resolvido",
            RecordStatus::Concluida => "Concluída",
            RecordStatus::PendenteRevisao => "Pendente Revisão",
        }
    }
}

impl Display for RecordStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s).ok_or_else(|| format!("Unknown status '{}'", s))
    }
}

/// Status pill state of a listing screen: every status, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(RecordStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: RecordStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Which durable collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Report,
    Inspection,
}

impl RecordKind {
    /// Fixed textual prefix of the protocol identifier.
    pub fn protocol_prefix(&self) -> &'static str {
        match self {
            RecordKind::Report => "EHS",
            RecordKind::Inspection => "INS",
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s).ok_or_else(|| format!("Unknown record kind '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    Incident,
    NearMiss,
    UnsafeCondition,
    Behavioral,
}

impl ReportType {
    pub fn label(&self) -> &'static str {
        match self {
            ReportType::Incident => "Incidente",
            ReportType::NearMiss => "Quase Acidente",
            ReportType::UnsafeCondition => "Condição Insegura",
            ReportType::Behavioral => "Observação Comportamental",
        }
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s).ok_or_else(|| format!("Unknown report type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Baixo",
            RiskLevel::Medium => "Médio",
            RiskLevel::High => "Alto",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s).ok_or_else(|| format!("Unknown risk level '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionType {
    #[serde(rename = "extinguisher")]
    Extinguisher,
    #[serde(rename = "ergonomics")]
    Ergonomics,
    #[serde(rename = "5s")]
    FiveS,
    #[serde(rename = "emergency")]
    Emergency,
}

impl InspectionType {
    pub fn label(&self) -> &'static str {
        match self {
            InspectionType::Extinguisher => "Inspeção de Extintores",
            InspectionType::Ergonomics => "Checklist de Ergonomia",
            InspectionType::FiveS => "Auditoria de 5S",
            InspectionType::Emergency => "Equipamentos de Emergência",
        }
    }

    /// Fixed checklist items, answered in order.
    pub fn items(&self) -> &'static [&'static str] {
        match self {
            InspectionType::Extinguisher => &[
                "Extintor está desobstruído e sinalizado",
                "Manômetro indica pressão adequada",
                "Lacre está intacto",
                "Extintor fixado adequadamente",
                "Prazo de validade dentro do limite",
            ],
            InspectionType::Ergonomics => &[
                "Monitor na altura adequada dos olhos",
                "Pés apoiados no chão ou apoio",
                "Punhos em posição neutra",
                "Cadeira com apoio lombar",
                "Iluminação adequada no posto",
            ],
            InspectionType::FiveS => &[
                "Área de trabalho organizada (Seiri)",
                "Materiais em seus devidos lugares (Seiton)",
                "Local limpo e sem sujeira (Seiso)",
                "Padrões visuais sendo seguidos (Seiketsu)",
                "Disciplina na manutenção dos 4S (Shitsuke)",
            ],
            InspectionType::Emergency => &[
                "Rota de fuga desobstruída",
                "Iluminação de emergência funcionando",
                "Alarme de incêndio operacional",
                "Equipamentos de primeiros socorros completos",
                "Ponto de encontro sinalizado",
            ],
        }
    }
}

impl FromStr for InspectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s).ok_or_else(|| format!("Unknown inspection type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChecklistAnswer {
    Conforme,
    NaoConforme,
    Na,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistResponse {
    pub item: String,
    pub answer: ChecklistAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A reported incident, near miss, unsafe condition or behavioral observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    /// Protocol identifier, e.g. `EHS-001234`.
    pub id: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Display date as entered, `YYYY-MM-DDTHH:MM[:SS]`.
    pub date: String,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A completed inspection checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    /// Protocol identifier, e.g. `INS-567890`.
    pub id: String,
    #[serde(rename = "type")]
    pub inspection_type: InspectionType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub date: String,
    pub status: RecordStatus,
    /// Percentage of applicable items answered `conforme`.
    pub conformity: u8,
    #[serde(default)]
    pub responses: Vec<ChecklistResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// What the listing layer needs from any record kind.
pub trait SubmissionRecord {
    fn protocol(&self) -> &str;

    fn status(&self) -> RecordStatus;

    /// Submission time when known, otherwise the display date.
    fn effective_timestamp(&self) -> Option<NaiveDateTime>;

    /// Free-text fields searched by the listing filter.
    fn search_texts(&self) -> Vec<&str>;
}

impl SubmissionRecord for IncidentReport {
    fn protocol(&self) -> &str {
        &self.id
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    fn effective_timestamp(&self) -> Option<NaiveDateTime> {
        effective_timestamp(self.submitted_at, &self.date)
    }

    fn search_texts(&self) -> Vec<&str> {
        let mut texts = vec![self.title.as_str(), self.description.as_str()];
        texts.extend(self.location.as_deref());
        texts
    }
}

impl SubmissionRecord for InspectionRecord {
    fn protocol(&self) -> &str {
        &self.id
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    fn effective_timestamp(&self) -> Option<NaiveDateTime> {
        effective_timestamp(self.submitted_at, &self.date)
    }

    fn search_texts(&self) -> Vec<&str> {
        let mut texts = vec![self.title.as_str()];
        texts.extend(self.location.as_deref());
        texts
    }
}

/// Parses a display date: `YYYY-MM-DDTHH:MM`, with optional seconds and fraction.
pub fn parse_display_date(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M"))
        .ok()
}

// Sample records carry only a display date, so both are compared on one naive axis.
fn effective_timestamp(submitted_at: Option<DateTime<Utc>>, date: &str) -> Option<NaiveDateTime> {
    submitted_at
        .map(|at| at.naive_utc())
        .or_else(|| parse_display_date(date))
}

/// Parses a wire token (`"near-miss"`, `"5s"`, ...) through its serde name.
pub(crate) fn parse_token<T: DeserializeOwned>(token: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(token.to_string())).ok()
}
