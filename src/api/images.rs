//! Image preview endpoint.

use axum::extract::{Multipart, State};

use super::{multipart_error, read_image_field, success, ApiResult};
use crate::errors::AppError;
use crate::AppState;

/// POST /api/images/preview - Validate an image and return it as a data URI.
/// Nothing is stored.
pub async fn preview_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<String> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        if let Some(file) = read_image_field(field).await? {
            let data_uri = state.repo.images().preview(&file).await?;
            return success(data_uri);
        }
    }

    Err(AppError::validation("image", "Please select an image file"))
}
