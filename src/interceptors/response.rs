use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(ApiSuccess<T>),
    Error(ApiError),
}

/// Success response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    status: StatusCode,
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl<T: Serialize> ApiSuccess<T> {
    /// Create a new success response with data
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    /// Create a 201 Created response with data
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::new(message, data)
        }
    }

    /// Create a new success response without data
    pub fn new_without_data(message: impl Into<String>) -> ApiSuccess<()> {
        ApiSuccess {
            success: true,
            message: message.into(),
            data: None,
            status: StatusCode::OK,
        }
    }
}

impl ApiError {
    /// Create a new error response
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(ErrorDetail {
                code: code.into(),
                details: None,
            }),
        }
    }

    /// Create a new error response with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(ErrorDetail {
                code: code.into(),
                details: Some(details),
            }),
        }
    }
}

// Implement IntoResponse for ApiSuccess
impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        let response = ApiResponse::Success(self);
        (status, Json(response)).into_response()
    }
}

// Implement IntoResponse for ApiError
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.determine_status_code();
        let response = ApiResponse::<()>::Error(self);
        (status, Json(response)).into_response()
    }
}

impl ApiError {
    fn determine_status_code(&self) -> StatusCode {
        if let Some(ref error) = self.error {
            match error.code.as_str() {
                "NOT_FOUND" | "EMPTY_QUEUE" => StatusCode::NOT_FOUND,
                "VALIDATION_ERROR" | "BAD_REQUEST" => StatusCode::BAD_REQUEST,
                "INTERNAL_ERROR" | "DATABASE_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            }
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}
