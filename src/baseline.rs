//! Sample records shown alongside the user's own submissions.
//!
//! These have a display date but no submission time, and inspections carry only
//! their headline conformity score.

use crate::record_model::{
    IncidentReport, InspectionRecord, InspectionType, RecordStatus, ReportType, RiskLevel,
};

pub fn sample_reports() -> Vec<IncidentReport> {
    vec![
        sample_report(
            "EHS-001234",
            ReportType::Incident,
            "Pequeno derramamento de material químico no laboratório",
            "2024-08-25T14:30:00",
            "Laboratório A - Setor 3",
            RecordStatus::EmAnalise,
            RiskLevel::Medium,
        ),
        sample_report(
            "EHS-001235",
            ReportType::NearMiss,
            "Colaborador quase escorregou em área molhada",
            "2024-08-24T09:15:00",
            "Corredor Principal",
            RecordStatus::Resolvido,
            RiskLevel::Low,
        ),
        sample_report(
            "EHS-001236",
            ReportType::UnsafeCondition,
            "Extintor com lacre rompido identificado",
            "2024-08-23T16:45:00",
            "Sala de Reuniões B",
            RecordStatus::Pendente,
            RiskLevel::High,
        ),
    ]
}

pub fn sample_inspections() -> Vec<InspectionRecord> {
    vec![
        sample_inspection(
            "INS-567890",
            InspectionType::Extinguisher,
            "2024-08-25T10:00:00",
            "Andar 2 - Setor A",
            RecordStatus::Concluida,
            95,
        ),
        sample_inspection(
            "INS-567891",
            InspectionType::FiveS,
            "2024-08-24T14:30:00",
            "Área de Produção",
            RecordStatus::Concluida,
            88,
        ),
        sample_inspection(
            "INS-567892",
            InspectionType::Ergonomics,
            "2024-08-23T11:15:00",
            "Escritório Administrativo",
            RecordStatus::PendenteRevisao,
            76,
        ),
    ]
}

fn sample_report(
    id: &str,
    report_type: ReportType,
    description: &str,
    date: &str,
    location: &str,
    status: RecordStatus,
    risk_level: RiskLevel,
) -> IncidentReport {
    IncidentReport {
        id: id.to_string(),
        report_type,
        title: report_type.label().to_string(),
        description: description.to_string(),
        location: Some(location.to_string()),
        risk_level: Some(risk_level),
        date: date.to_string(),
        status,
        submitted_at: None,
    }
}

fn sample_inspection(
    id: &str,
    inspection_type: InspectionType,
    date: &str,
    location: &str,
    status: RecordStatus,
    conformity: u8,
) -> InspectionRecord {
    InspectionRecord {
        id: id.to_string(),
        inspection_type,
        title: inspection_type.label().to_string(),
        location: Some(location.to_string()),
        date: date.to_string(),
        status,
        conformity,
        responses: Vec::new(),
        submitted_at: None,
    }
}
