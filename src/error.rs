use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::newsletter::StoreError;

pub const EMAIL_UNAVAILABLE_MESSAGE: &str =
    "Email service temporarily unavailable. Please try again later.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Email settings are incomplete; carries the missing variable names
    #[error("Email configuration incomplete: {}", .0.join(", "))]
    EmailNotConfigured(Vec<String>),

    /// Delivery failed; the message is safe to show to end users
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::EmailNotConfigured(missing) => {
                let status = StatusCode::SERVICE_UNAVAILABLE;
                let body = Json(json!({
                    "error": EMAIL_UNAVAILABLE_MESSAGE,
                    "code": status.as_u16(),
                    "missingEnvVars": missing,
                }));
                return (status, body).into_response();
            }
            AppError::DeliveryFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Store(err) => {
                tracing::error!(error = %err, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
