//! Tree API endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    Extension,
};
use serde::Deserialize;

use super::{multipart_error, read_image_field, success, success_with_warning, ApiResult};
use crate::directory::{DirectoryPage, FilterCriteria};
use crate::errors::AppError;
use crate::images::ImageFile;
use crate::models::{AdminSession, SignageLink, Tree, TreeFormInput};
use crate::AppState;

/// Query parameters for the tree list.
#[derive(Debug, Default, Deserialize)]
pub struct TreeListQuery {
    pub q: Option<String>,
    pub species: Option<String>,
    pub location: Option<String>,
    pub family: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

/// GET /api/trees - Filtered tree list with facets.
pub async fn list_trees(
    State(state): State<AppState>,
    Query(query): Query<TreeListQuery>,
) -> ApiResult<DirectoryPage> {
    let criteria = FilterCriteria {
        search_query: query.q,
        species: query.species,
        location: query.location,
        family: query.family,
    };

    let page = state
        .directory
        .view(&state.repo, criteria, query.refresh)
        .await?;
    success(page)
}

/// GET /api/trees/{id} - Get a single tree.
pub async fn get_tree(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Tree> {
    let tree = state.repo.get_tree(&id).await?;
    success(tree)
}

/// GET /api/trees/{id}/signage - Link encoded on a tree's printed QR sign.
pub async fn get_signage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SignageLink> {
    let tree = state.repo.get_tree(&id).await?;
    success(SignageLink::for_tree(&state.config.public_base_url, &tree.id))
}

/// POST /api/admin/trees - Create a tree from a multipart form.
pub async fn create_tree(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    multipart: Multipart,
) -> ApiResult<Tree> {
    let (input, image) = read_tree_form(multipart).await?;

    let outcome = state.repo.add_tree(input, image).await?;
    tracing::info!(
        "Admin {} created tree {}",
        session.identity.username,
        outcome.tree.id
    );
    state.directory.refresh_quietly(&state.repo).await;

    let warning = outcome.warning();
    success_with_warning(outcome.tree, warning)
}

/// DELETE /api/admin/trees/{id} - Delete a tree and its image.
pub async fn delete_tree(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    let deleted = state.repo.delete_tree(&id).await?;
    tracing::info!("Admin {} deleted tree {}", session.identity.username, id);
    state.directory.refresh_quietly(&state.repo).await;

    success(deleted)
}

/// POST /api/admin/trees/{id}/image - Replace a tree's image.
pub async fn replace_tree_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Tree> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("image") {
            image = read_image_field(field).await?;
        }
    }
    let image = image.ok_or_else(|| AppError::validation("image", "Please select an image file"))?;

    let tree = state.repo.replace_image(&id, &image).await?;
    state.directory.refresh_quietly(&state.repo).await;

    success(tree)
}

/// POST /api/admin/trees/predefined - Insert the predefined species list.
pub async fn add_predefined_trees(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<Vec<Tree>> {
    let outcome = state.repo.add_predefined_batch().await?;
    tracing::info!(
        "Admin {} added {} predefined trees",
        session.identity.username,
        outcome.trees.len()
    );
    state.directory.refresh_quietly(&state.repo).await;

    let warning = outcome.warning();
    success_with_warning(outcome.trees, warning)
}

/// Split a tree form into its text fields and optional image part.
async fn read_tree_form(
    mut multipart: Multipart,
) -> Result<(TreeFormInput, Option<ImageFile>), AppError> {
    let mut input = TreeFormInput::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            image = read_image_field(field).await?;
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "scientificName" => input.scientific_name = value,
            "family" => input.family = value,
            "commonNameEnglish" => input.common_name_english = Some(value),
            "commonNameMalayalam" => input.common_name_malayalam = Some(value),
            "nativeRange" => input.native_range = Some(value),
            "species" => input.species = Some(value),
            "location" => input.location = value,
            "description" => input.description = Some(value),
            "skipImageUpload" => {
                input.skip_image_upload = matches!(value.trim(), "true" | "1" | "on")
            }
            other => tracing::debug!("Ignoring unknown form field {}", other),
        }
    }

    Ok((input, image))
}
