//! Error handling for the libris HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use libris_db::DbError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

/// Standard error response format for all HTTP errors
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub details: Vec<serde_json::Value>,
    pub message: String,
    pub code: String,
    pub trace_id: String,
    pub timestamp: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("payload too large: {message}")]
    PayloadTooLarge { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Create a payload-too-large error
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
            code: "payload_too_large".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let timestamp = now.format(&Rfc3339).unwrap_or_else(|_| now.to_string());
        let status = self.status();

        let (error_code, message) = match self {
            AppError::NotFound { message, code }
            | AppError::BadRequest { message, code }
            | AppError::PayloadTooLarge { message, code } => (code, message),
            AppError::Internal(e) => {
                tracing::error!(error_id = %error_id, error = ?e, "internal error");
                ("internal_error".to_string(), e.to_string())
            }
        };

        tracing::warn!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            "Request error"
        );

        // Internal details stay in the logs for release builds
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let body = ErrorBody {
            details: Vec::new(),
            message,
            code: error_code,
            trace_id: error_id.to_string(),
            timestamp,
        };

        (status, Json(json!({ "error": body }))).into_response()
    }
}
