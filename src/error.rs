//! Application error types

use crate::metrics::projector::ProjectionError;
use crate::metrics::surplus::SurplusOverflow;
use crate::metrics::validator::ValidationError;
use crate::services::session_service::SessionStep;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Spreadsheet error: {0}")]
    Sheets(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Invalid data: {0}")]
    Validation(#[from] ValidationError),

    #[error("Surplus error: {0}")]
    Surplus(#[from] SurplusOverflow),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("No valid input after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("{step} failed: {source}")]
    StepFailed {
        step: SessionStep,
        #[source]
        source: Box<AppError>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::Sheets(_) => "SHEETS_ERROR",
            AppError::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Projection(ProjectionError::InsufficientHistory { .. }) => {
                "INSUFFICIENT_HISTORY"
            }
            AppError::Surplus(_) | AppError::Projection(ProjectionError::OutOfRange { .. }) => {
                "OUT_OF_RANGE"
            }
            AppError::Projection(ProjectionError::CategoryCount { .. }) => "SCHEMA_MISMATCH",
            AppError::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            AppError::StepFailed { source, .. } => source.code(),
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the failure came from the remote spreadsheet store
    pub fn is_remote(&self) -> bool {
        match self {
            AppError::Http(_) | AppError::Sheets(_) => true,
            AppError::StepFailed { source, .. } => source.is_remote(),
            _ => false,
        }
    }
}

/// Error summary shown to the operator
#[derive(Debug)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub step: Option<String>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let step = match err {
            AppError::StepFailed { step, .. } => Some(step.to_string()),
            _ => None,
        };

        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
            step,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
