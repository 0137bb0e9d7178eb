//! API error responses
//!
//! Every failed request answers with `{"error": ..., "code": ...}`.
//! Internal failures are logged in full and answered with a generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::validate::ValidationError;
use crate::auth::AuthError;
use crate::observability::Logger;
use crate::shop::ShopError;

/// Message for requests without a valid token for the target identity
pub const FORBIDDEN_MESSAGE: &str = "Missing required token in header, or token is invalid";

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Handler failure
#[derive(Debug)]
pub enum ApiError {
    /// A field was missing or malformed
    Validation(ValidationError),
    /// Well-formed request the current state cannot satisfy
    BadRequest(String),
    /// Missing or invalid token
    Forbidden,
    /// Requested record does not exist
    NotFound(String),
    /// The path exists but not for this method
    MethodNotAllowed,
    /// Anything the client cannot fix
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Forbidden => FORBIDDEN_MESSAGE.to_string(),
            ApiError::MethodNotAllowed => "Method not allowed".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            Logger::error("API_INTERNAL_ERROR", &[("detail", detail.as_str())]);
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.message(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

/// Method fallback shared by every resource route
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.status_code() {
            400 => ApiError::BadRequest(err.to_string()),
            404 => ApiError::NotFound(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        match err.status_code() {
            400 => ApiError::BadRequest(err.to_string()),
            404 => ApiError::NotFound(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
