//! Error types for the overlay server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use survey_overlay::OverlayError;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("The {field} file exceeds the {limit} byte upload limit")]
    PayloadTooLarge { field: String, limit: usize },

    #[error("Request body is too large")]
    BodyTooLarge,

    #[error("File not found")]
    NotFound,

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } | AppError::BodyTooLarge => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Overlay(e) if e.is_invalid_input() => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Overlay(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Overlay(e @ OverlayError::CompositeFailure { .. }) => {
                tracing::error!("Overlay failed: {}", e);
                format!("Error processing PDFs: {}", e)
            }
            AppError::Overlay(e) if !e.is_invalid_input() => {
                tracing::error!("Overlay error: {}", e);
                "Error processing PDFs".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                "Failed to access the processed PDF".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            status: "error",
            message,
        });

        (status, body).into_response()
    }
}
