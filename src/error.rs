//! Error types for the HTTP surface
//!
//! Bodies carry a single fixed `error` string; internal detail goes to the
//! log only.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::conversion::ConversionError;
use crate::storage::StorageError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("File conversion failed")]
    ConversionFailed,

    #[error("File not found: {0}")]
    NotFound(String),

    /// The multipart body could not be read (too large, malformed)
    #[error("Invalid upload: {message}")]
    InvalidUpload { status: StatusCode, message: String },

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::NoFile => AppError::NoFile,
            ConversionError::Failed(_) => AppError::ConversionFailed,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(name),
            other => AppError::Storage(other),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InvalidUpload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoFile => StatusCode::BAD_REQUEST,
            AppError::ConversionFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidUpload { status, .. } => *status,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::NoFile => "No file uploaded".to_string(),
            AppError::ConversionFailed => "File conversion failed".to_string(),
            AppError::NotFound(name) => {
                tracing::debug!(name = %name, "Output not found");
                "File not found".to_string()
            }
            AppError::InvalidUpload { message, .. } => {
                tracing::warn!(status = %status, "Rejected upload: {}", message);
                message.clone()
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
