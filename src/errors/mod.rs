//! Error handling module for the campus tree backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and the
//! `{success, error}` response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UPLOAD_FAILED: &str = "UPLOAD_FAILED";
    pub const BACKEND_UNAVAILABLE: &str = "BACKEND_UNAVAILABLE";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";
}

/// Path of the admin login entry point handed back to unauthenticated callers.
pub const LOGIN_PATH: &str = "/admin/login";

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Admin session required; `redirect` is the originally requested path
    Unauthorized {
        message: String,
        redirect: Option<String>,
    },
    /// Username/password check failed (never says which part)
    InvalidCredentials,
    /// Resource not found
    NotFound(String),
    /// Local, pre-network validation failure on a single field
    Validation { field: String, message: String },
    /// Object storage write failed
    Upload(String),
    /// Row store or storage backend failure
    Backend(String),
    /// Malformed request
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// The request did not finish within the configured timeout
    Timeout,
}

impl AppError {
    /// Shorthand for a field-specific validation error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Upload(_) => StatusCode::BAD_GATEWAY,
            AppError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized { .. } => codes::UNAUTHORIZED,
            AppError::InvalidCredentials => codes::INVALID_CREDENTIALS,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation { .. } => codes::VALIDATION_ERROR,
            AppError::Upload(_) => codes::UPLOAD_FAILED,
            AppError::Backend(_) => codes::BACKEND_UNAVAILABLE,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::Timeout => codes::REQUEST_TIMEOUT,
        }
    }

    /// Get the human-readable error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized { message, .. } => message.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation { message, .. } => message.clone(),
            AppError::Upload(msg) => msg.clone(),
            AppError::Backend(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
            AppError::Timeout => "Request timed out".to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Backend(format!("Backend unavailable: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage I/O error: {:?}", err);
        AppError::Backend(format!("Storage unavailable: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// Error response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let field = match error {
            AppError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };

        let details = match error {
            AppError::Unauthorized { redirect, .. } => Some(serde_json::json!({
                "loginUrl": LOGIN_PATH,
                "redirect": redirect,
            })),
            _ => None,
        };

        Self {
            success: false,
            error: error.message(),
            code: error.error_code().to_string(),
            field,
            details,
        }
    }
}

/// Error handler for fallible tower middleware (the request timeout).
pub async fn handle_middleware_error(err: axum::BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request timed out");
        AppError::Timeout
    } else {
        tracing::error!("Middleware error: {}", err);
        AppError::Internal(format!("Unhandled middleware error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
