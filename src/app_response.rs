use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::forms::DraftError;
use crate::submission::SubmitError;

/// Result envelope handed across the C ABI, and the error type of the storage layer.
#[derive(Debug, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    /// Field name to message, for a form that failed validation.
    FieldErrors(BTreeMap<String, String>),
    /// Transient submission failure; the form is kept so the user can retry.
    SubmissionFailed(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::FieldErrors(errors) => {
                let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
                write!(f, "Invalid fields: {}", fields.join(", "))
            }
            AppResponse::SubmissionFailed(msg) => write!(f, "Submission failed: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<lmdb::Error> for AppResponse {
    fn from(err: lmdb::Error) -> Self {
        match err {
            lmdb::Error::NotFound => AppResponse::NotFound("Slot not found".to_string()),
            lmdb::Error::MapFull => {
                AppResponse::DatabaseError("Storage quota exceeded (map full)".to_string())
            }
            lmdb::Error::Corrupted => {
                AppResponse::DatabaseError("Database is corrupted".to_string())
            }
            _ => AppResponse::DatabaseError(format!("LMDB error: {}", err)),
        }
    }
}

impl From<std::io::Error> for AppResponse {
    fn from(err: std::io::Error) -> Self {
        AppResponse::DatabaseError(format!("IO error: {}", err))
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<DraftError> for AppResponse {
    fn from(err: DraftError) -> Self {
        AppResponse::ValidationError(err.to_string())
    }
}

impl From<SubmitError> for AppResponse {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(errors) => AppResponse::FieldErrors(errors),
            SubmitError::Draft(err) => AppResponse::from(err),
            SubmitError::Offline => AppResponse::SubmissionFailed(SubmitError::Offline.to_string()),
        }
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AppResponse::Ok(_))
    }
}
