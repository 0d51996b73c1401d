//! Error taxonomy shared by every ingestion and record-management step.
//!
//! Each variant maps to one HTTP-style status and renders as a
//! [`ProblemDetails`] payload at the outer surface.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default base URI for the `type` field of problem payloads.
pub const DEFAULT_ERROR_TYPE_BASE: &str = "https://api.domain.com/errors/";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Wrong kind of input handed to the record factory or reader.
    #[error("{0}")]
    InputShape(String),

    /// One or more violations of the mandatory-field contract.
    #[error("{detail}")]
    Validation { detail: String, errors: Vec<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The backing store rejected or failed an operation.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Validation failure carrying the full violation list.
    pub fn validation(detail: impl Into<String>, errors: Vec<String>) -> Self {
        Error::Validation { detail: detail.into(), errors }
    }

    /// Validation failure with a single message used as both detail and error.
    pub fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::Validation { detail: message.clone(), errors: vec![message] }
    }

    /// Validation failure listing required columns absent from an upload.
    pub fn missing_columns(missing: Vec<String>) -> Self {
        Error::Validation {
            detail: format!("Missing required columns: {}", missing.join(", ")),
            errors: missing,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Error::InputShape(_) | Error::Validation { .. } => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::Persistence(_) | Error::Io(_) | Error::Json(_) => 500,
        }
    }

    /// Slug appended to the error type base.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InputShape(_) => "input-shape",
            Error::Validation { .. } => "validation-failed",
            Error::NotFound(_) => "not-found",
            Error::Conflict(_) => "conflict",
            Error::Persistence(_) | Error::Io(_) | Error::Json(_) => "persistence-failed",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Error::InputShape(_) => "Invalid Input",
            Error::Validation { .. } => "Validation Error",
            Error::NotFound(_) => "Not Found",
            Error::Conflict(_) => "Conflict",
            Error::Persistence(_) | Error::Io(_) | Error::Json(_) => "Database Error",
        }
    }

    /// Every violation carried by this error; single-cause errors yield one entry.
    pub fn errors(&self) -> Vec<String> {
        match self {
            Error::Validation { errors, .. } => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Structured error payload returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub errors: Vec<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    /// Render an error; `path` becomes `instance` as `uri=<path>`.
    pub fn from_error(error: &Error, type_base: &str, path: Option<&str>) -> Self {
        Self {
            title: error.title().to_string(),
            status: error.status(),
            detail: error.to_string(),
            error_type: format!("{}{}", type_base, error.kind()),
            errors: error.errors(),
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            instance: path.map(|p| format!("uri={}", p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_category() {
        assert_eq!(Error::InputShape("x".into()).status(), 400);
        assert_eq!(Error::invalid("bad").status(), 400);
        assert_eq!(Error::NotFound("gone".into()).status(), 404);
        assert_eq!(Error::Conflict("dup".into()).status(), 409);
        assert_eq!(Error::Persistence("down".into()).status(), 500);
    }

    #[test]
    fn test_missing_columns_lists_every_column() {
        let err = Error::missing_columns(vec!["ROLE".into(), "NAME".into()]);
        assert_eq!(err.errors(), vec!["ROLE".to_string(), "NAME".to_string()]);
        assert_eq!(err.to_string(), "Missing required columns: ROLE, NAME");
    }

    #[test]
    fn test_problem_details_payload() {
        let err = Error::validation("Employee validation failed", vec!["NAME is required".into()]);
        let problem =
            ProblemDetails::from_error(&err, DEFAULT_ERROR_TYPE_BASE, Some("/api/employee"));

        assert_eq!(problem.status, 400);
        assert_eq!(problem.title, "Validation Error");
        assert_eq!(problem.error_type, "https://api.domain.com/errors/validation-failed");
        assert_eq!(problem.instance.as_deref(), Some("uri=/api/employee"));
        assert!(problem.timestamp.ends_with('Z'));

        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["type"], "https://api.domain.com/errors/validation-failed");
        assert_eq!(json["errors"][0], "NAME is required");
    }

    #[test]
    fn test_instance_omitted_outside_http() {
        let err = Error::NotFound("Profile mapping not found".into());
        let problem = ProblemDetails::from_error(&err, DEFAULT_ERROR_TYPE_BASE, None);
        let json = serde_json::to_value(&problem).unwrap();
        assert!(json.get("instance").is_none());
        assert_eq!(json["detail"], "Profile mapping not found");
    }
}
