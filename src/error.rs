use axum::{Json, http::{StatusCode, header}, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::LectureSummary;

/// Hint sent with retryable failures; sections are short-lived.
const RETRY_AFTER_SECS: &str = "1";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Missing or unknown caller identity")]
    Unauthorized,

    #[error("Administrator role required")]
    Forbidden,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    /// Storage failures and section timeouts leave no partial state, so the
    /// caller may resubmit.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Unavailable(_))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<LectureSummary>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: status.to_string(),
            message: message.into(),
            conflict: None,
        }
    }

    /// Body for a slot that is already taken.
    pub fn rejected(conflict: LectureSummary) -> Self {
        let message = format!(
            "Instructor already has a lecture on {} from {} to {}",
            conflict.date,
            conflict.start_time.format("%H:%M"),
            conflict.end_time.format("%H:%M"),
        );
        Self {
            error: StatusCode::CONFLICT.to_string(),
            message,
            conflict: Some(conflict),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let (status, error_message) = match self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::InvalidRange(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or unknown caller identity".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Administrator role required".to_string(),
            ),
            AppError::Unavailable(msg) => {
                error!("service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage temporarily unavailable, please retry".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(status, error_message));

        if retryable {
            return (status, [(header::RETRY_AFTER, RETRY_AFTER_SECS)], body).into_response();
        }
        (status, body).into_response()
    }
}
