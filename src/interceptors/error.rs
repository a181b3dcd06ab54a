use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use thiserror::Error;
use serde_json::json;

use super::response::ApiError;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty queue: {0}")]
    EmptyQueue(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Error codes for API responses
#[derive(Debug)]
pub enum ErrorCode {
    DatabaseError,
    ValidationError,
    NotFound,
    EmptyQueue,
    BadRequest,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::EmptyQueue => "EMPTY_QUEUE",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::DatabaseError(_) => ErrorCode::DatabaseError,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::EmptyQueue(_) => ErrorCode::EmptyQueue,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::InternalError(_) => ErrorCode::InternalError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // An empty queue on call-next mirrors a missing position lookup.
            AppError::EmptyQueue(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        let error_code = self.error_code().as_str();
        let message = self.to_string();

        // Add additional details for specific errors
        match self {
            AppError::ValidationError(msg) => {
                ApiError::with_details(
                    message,
                    error_code,
                    json!({ "validation_errors": msg }),
                )
            }
            _ => ApiError::new(message, error_code),
        }
    }
}

// Implement IntoResponse for AppError
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                tracing::error!("Application error: {:?}", self)
            }
            _ => tracing::debug!("Client error: {:?}", self),
        }

        let api_error = self.to_api_error();
        api_error.into_response()
    }
}

// Result type alias
pub type AppResult<T> = Result<T, AppError>;
