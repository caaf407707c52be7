//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
///
/// A resource that exists but belongs to another user is reported as
/// `NotFound`, indistinguishable from a resource that does not exist.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed required field
    #[error("{0}")]
    Validation(String),

    /// No bearer token on a protected route
    #[error("Access denied. No token provided.")]
    AccessDenied,

    /// Bearer token failed verification (bad signature, expired, malformed)
    #[error("Invalid token.")]
    InvalidToken,

    /// Wrong email or password at login
    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// Resource absent, or owned by another user
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email at registration
    #[error("{0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AccessDenied => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
