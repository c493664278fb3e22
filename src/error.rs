use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// One candidate date that could not be committed during bulk expansion.
#[derive(Debug, Clone, Serialize)]
pub struct FailedDate {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Field-level validation failure, rejected before any persistence.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bulk pattern expansion was rolled back; nothing was committed.
    /// Lists exactly which candidate dates failed and which would have
    /// succeeded, so the caller can retry precisely.
    #[error("Pattern expansion failed for {} date(s)", failed.len())]
    Expansion {
        failed: Vec<FailedDate>,
        succeeded: Vec<NaiveDate>,
    },
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Database(e) => {
                tracing::error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "storage_error" }),
                )
            }
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "validation_failed",
                    "field": field,
                    "message": message,
                }),
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": "not_found", "resource": what }),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "unauthorized" }),
            ),
            ApiError::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": "forbidden", "reason": reason }),
            ),
            ApiError::Expansion { failed, succeeded } => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": "expansion_failed",
                    "failed_dates": failed,
                    "succeeded_dates": succeeded,
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
