use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdf_tools::PdfToolsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub detail: String,
}

/// Application-specific error types for the API
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors from the pdf-tools library
    #[error(transparent)]
    Tools(#[from] PdfToolsError),

    /// The multipart body could not be read
    #[error("Failed to read multipart form: {0}")]
    Multipart(#[from] MultipartError),

    /// A form field was missing or malformed
    #[error("{0}")]
    BadRequest(String),

    /// Building the split archive failed
    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The blocking worker panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn missing_field(name: &str) -> Self {
        AppError::BadRequest(format!("Missing {name} field"))
    }

    pub fn invalid_field(name: &str) -> Self {
        AppError::BadRequest(format!("Invalid {name} format"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Tools(e) => match e {
                PdfToolsError::Input(_)
                | PdfToolsError::EmptyInput
                | PdfToolsError::InvalidSpec(_)
                | PdfToolsError::InvalidRotation(_) => StatusCode::BAD_REQUEST,
                PdfToolsError::Pdf(_)
                | PdfToolsError::Image(_)
                | PdfToolsError::Codec(_)
                | PdfToolsError::Ocr(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PdfToolsError::OcrUnavailable(_) => StatusCode::NOT_IMPLEMENTED,
                PdfToolsError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Multipart(e) => e.status(),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Archive(_) | AppError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), %detail, "Request failed");
        } else {
            warn!(status = status.as_u16(), %detail, "Request rejected");
        }

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
