//! REST API module.
//!
//! Every handler answers with the `{success, data}` envelope or an
//! `AppError` rendered as `{success: false, error, code}`.

mod auth;
mod images;
mod trees;

pub use auth::*;
pub use images::*;
pub use trees::*;

use axum::{
    extract::multipart::Field,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::images::ImageFile;

/// Success response envelope. `warning` marks a degraded success.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            warning: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a successful API response that reports a partial failure.
pub fn success_with_warning<T: Serialize>(data: T, warning: Option<String>) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        data,
        warning,
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid form data: {}", err))
}

/// Read a file part. An empty part with no file name means nothing was chosen.
async fn read_image_field(field: Field<'_>) -> Result<Option<ImageFile>, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(ImageFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}
