//! Error handling
//!
//! Defines the catalog error taxonomy and its conversion into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

/// Main application errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad or missing input: photo count, title length, price, image type/size.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown vehicle id or image reference.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document or file I/O failure. The message may contain paths and is never sent to clients.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error body returned by the API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    code: String,
}

impl AppError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().to_string();
        let (status, title, message) = match self {
            AppError::Validation(msg) => {
                warn!("⚠️ Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, "Validation Error", msg)
            }

            AppError::NotFound(msg) => {
                warn!("❌ Resource not found: {}", msg);
                (StatusCode::NOT_FOUND, "Not Found", msg)
            }

            AppError::BadRequest(msg) => {
                warn!("⚠️ Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "Bad Request", msg)
            }

            AppError::PayloadTooLarge(msg) => {
                warn!("⚠️ Payload too large: {}", msg);
                (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", msg)
            }

            AppError::Storage(msg) => {
                error!("❌ Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage Error",
                    "An error occurred while accessing the catalog storage".to_string(),
                )
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: title.to_string(),
            message,
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let reasons: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                })
            })
            .collect();

        AppError::Validation(reasons.join("; "))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(format!("malformed catalog document: {}", e))
    }
}

/// Typed result for fallible operations
pub type AppResult<T> = Result<T, AppError>;

/// Helper for validation errors with a human-readable reason
pub fn validation_error(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

/// Helper for missing vehicles
pub fn vehicle_not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Vehicle with id '{}' not found", id))
}
