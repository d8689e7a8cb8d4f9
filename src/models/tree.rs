//! Tree models: the stored row shape and the view shape served to clients.

use serde::{Deserialize, Serialize};

/// One row of the `trees` table, exactly as the row store holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: String,
    pub scientific_name: String,
    pub family: String,
    pub common_name_english: Option<String>,
    pub common_name_malayalam: Option<String>,
    pub native_range: Option<String>,
    pub location: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Server-assigned insertion timestamp (RFC 3339 text)
    pub added_date: String,
}

/// Column values for an insert; the store assigns `id` and `added_date`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTreeRow {
    pub scientific_name: String,
    pub family: String,
    pub common_name_english: String,
    pub common_name_malayalam: Option<String>,
    pub native_range: Option<String>,
    pub location: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A catalogued botanical specimen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub id: String,
    /// Display name, derived from the scientific name
    pub name: String,
    pub scientific_name: String,
    pub family: String,
    pub common_name_english: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name_malayalam: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_range: Option<String>,
    /// Species designation, derived from the scientific name
    pub species: String,
    pub location: String,
    pub description: String,
    /// Empty when no image is attached
    pub image_url: String,
    /// `YYYY-MM-DD`
    pub added_date: String,
    pub pending_image: bool,
}

/// Form input for creating a tree.
#[derive(Debug, Clone, Default)]
pub struct TreeFormInput {
    pub scientific_name: String,
    pub family: String,
    pub common_name_english: Option<String>,
    pub common_name_malayalam: Option<String>,
    pub native_range: Option<String>,
    pub species: Option<String>,
    pub location: String,
    pub description: Option<String>,
    /// Create the record now and attach the image later
    pub skip_image_upload: bool,
}

/// Link printed on physical signage, pointing back at a tree's detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignageLink {
    pub tree_id: String,
    pub detail_url: String,
    pub download_name: String,
}

impl SignageLink {
    pub fn for_tree(public_base_url: &str, tree_id: &str) -> Self {
        Self {
            tree_id: tree_id.to_string(),
            detail_url: format!("{}/tree/{}", public_base_url.trim_end_matches('/'), tree_id),
            download_name: format!("tree-qr-code-{}.svg", tree_id),
        }
    }
}
