//! HTTP error response conversion
//!
//! Every typed failure the core can produce maps deterministically to one
//! response shape here. Handlers return
//! `Result<impl IntoResponse, HttpAppError>` and rely on `?` with the `From`
//! impls below.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medius_core::{AppError, ErrorMetadata, LogLevel};
use medius_media::MediaValidationError;
use medius_storage::StorageError;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Wrapper over the typed error domains so each can implement `IntoResponse`
/// without violating orphan rules.
#[derive(Debug)]
pub enum HttpAppError {
    App(AppError),
    Validation(MediaValidationError),
    Storage(StorageError),
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError::App(err)
    }
}

impl From<MediaValidationError> for HttpAppError {
    fn from(err: MediaValidationError) -> Self {
        HttpAppError::Validation(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError::Storage(err)
    }
}

impl HttpAppError {
    fn parts(&self) -> (StatusCode, ErrorResponse, LogLevel) {
        match self {
            HttpAppError::Validation(err) => validation_parts(err),
            HttpAppError::Storage(err) => storage_parts(err),
            HttpAppError::App(err) => (
                StatusCode::from_u16(err.http_status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                ErrorResponse {
                    error: err.client_message(),
                    code: err.error_code().to_string(),
                    details: None,
                },
                err.log_level(),
            ),
        }
    }
}

fn validation_parts(err: &MediaValidationError) -> (StatusCode, ErrorResponse, LogLevel) {
    match err {
        MediaValidationError::InvalidFileName => (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: err.to_string(),
                code: "INVALID_FILE_NAME".to_string(),
                details: None,
            },
            LogLevel::Debug,
        ),
        MediaValidationError::InvalidFileExtension {
            extension,
            valid_extensions,
            media_type,
        } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: err.to_string(),
                code: "INVALID_FILE_EXTENSION".to_string(),
                details: Some(json!({
                    "extension": extension,
                    "valid_extensions": valid_extensions,
                    "media_type": media_type,
                })),
            },
            LogLevel::Debug,
        ),
        MediaValidationError::FileTooLarge {
            file_size,
            max_file_size,
            media_type,
        } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorResponse {
                error: err.to_string(),
                code: "FILE_TOO_LARGE".to_string(),
                details: Some(json!({
                    "file_size": file_size,
                    "max_file_size": max_file_size,
                    "media_type": media_type,
                })),
            },
            LogLevel::Debug,
        ),
        MediaValidationError::ImageProcessing(message) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: message.clone(),
                code: "IMAGE_PROCESSING_ERROR".to_string(),
                details: None,
            },
            LogLevel::Warn,
        ),
    }
}

fn storage_parts(err: &StorageError) -> (StatusCode, ErrorResponse, LogLevel) {
    match err {
        StorageError::StorageNotFound(storage_id) => (
            StatusCode::NOT_FOUND,
            ErrorResponse {
                error: format!("Storage {} not found", storage_id),
                code: "STORAGE_NOT_FOUND".to_string(),
                details: None,
            },
            LogLevel::Debug,
        ),
        StorageError::InvalidFilename(_) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: err.to_string(),
                code: "INVALID_INPUT".to_string(),
                details: None,
            },
            LogLevel::Debug,
        ),
        // Backend failures stay opaque to the caller; full detail goes to the
        // log in into_response.
        StorageError::NoDefaultStorage
        | StorageError::UploadFailed(_)
        | StorageError::DeleteFailed(_)
        | StorageError::LinkFailed(_)
        | StorageError::ConfigError(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse {
                error: "Failed to access storage".to_string(),
                code: "STORAGE_ERROR".to_string(),
                details: None,
            },
            LogLevel::Error,
        ),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let (status, body, log_level) = self.parts();

        match log_level {
            LogLevel::Error => {
                tracing::error!(status = %status, code = %body.code, error = ?self, "Request failed")
            }
            LogLevel::Warn => {
                tracing::warn!(status = %status, code = %body.code, error = ?self, "Request failed")
            }
            LogLevel::Debug => {
                tracing::debug!(status = %status, code = %body.code, "Request rejected")
            }
        }

        (status, Json(body)).into_response()
    }
}
