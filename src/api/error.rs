//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::batch::BatchError;
use crate::import::ImportError;
use crate::pipeline::PipelineError;
use crate::report::ReportError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("File too large: {0}")]
    TooLarge(String),
    #[error("{0}")]
    Extraction(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::TooLarge(_) => "FILE_TOO_LARGE",
            ApiError::Extraction(_) => "EXTRACTION_FAILED",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                detail.clone()
            }
            ApiError::UnsupportedFormat(detail)
            | ApiError::BadRequest(detail)
            | ApiError::TooLarge(detail)
            | ApiError::Extraction(detail) => {
                tracing::warn!(code, detail, "Upload rejected");
                detail.clone()
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedFormat(_) => ApiError::UnsupportedFormat(err.to_string()),
            ImportError::FileTooLarge { .. } => ApiError::TooLarge(err.to_string()),
            ImportError::MissingFileName => ApiError::BadRequest(err.to_string()),
            // A file that parses as neither CSV nor workbook is the client's problem.
            ImportError::Csv(_) | ImportError::Workbook(_) | ImportError::EmptyWorkbook => {
                ApiError::Extraction(err.to_string())
            }
            ImportError::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Extraction(err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Import(e) => e.into(),
            BatchError::Pipeline(e) => e.into(),
            BatchError::Report(e) => e.into(),
        }
    }
}
