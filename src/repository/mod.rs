//! Tree repository: the catalog operations the web client calls.
//!
//! Every operation returns `Result<_, AppError>`; backend detail is logged
//! here and replaced with a human-readable message.

use std::collections::HashSet;

use crate::db::Store;
use crate::errors::AppError;
use crate::images::{ImageFile, ImagePipeline};
use crate::mapper;
use crate::models::{NewTreeRow, Tree, TreeFormInput};
use crate::seed;

/// Result of creating a tree. `image_error` is set when the record was
/// created but its image could not be stored.
#[derive(Debug, Clone)]
pub struct AddTreeOutcome {
    pub tree: Tree,
    pub image_error: Option<String>,
}

impl AddTreeOutcome {
    pub fn warning(&self) -> Option<String> {
        self.image_error
            .as_ref()
            .map(|e| format!("Tree added, but the image could not be uploaded: {}", e))
    }
}

/// Result of the predefined batch insert.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub trees: Vec<Tree>,
    pub attempted: usize,
}

impl BatchOutcome {
    pub fn failed(&self) -> usize {
        self.attempted - self.trees.len()
    }

    /// Set when fewer trees were created than attempted.
    pub fn warning(&self) -> Option<String> {
        (self.failed() > 0).then(|| {
            format!(
                "Added {} of {} predefined trees; {} failed",
                self.trees.len(),
                self.attempted,
                self.failed()
            )
        })
    }
}

/// Catalog operations over the row store and the image pipeline.
#[derive(Clone)]
pub struct TreeRepository {
    store: Store,
    images: ImagePipeline,
}

impl TreeRepository {
    pub fn new(store: Store, images: ImagePipeline) -> Self {
        Self { store, images }
    }

    pub fn images(&self) -> &ImagePipeline {
        &self.images
    }

    /// All trees, one per scientific name (first seen wins). An empty
    /// catalog yields the built-in example trees.
    pub async fn list_trees(&self) -> Result<Vec<Tree>, AppError> {
        let rows = self
            .store
            .list_tree_rows()
            .await
            .map_err(backend_context("fetch trees"))?;

        if rows.is_empty() {
            tracing::debug!("Catalog is empty, serving example trees");
            return Ok(seed::example_trees());
        }

        Ok(dedupe_by_scientific_name(
            rows.into_iter().map(mapper::to_tree).collect(),
        ))
    }

    /// One tree by id, falling back to the example trees.
    pub async fn get_tree(&self, id: &str) -> Result<Tree, AppError> {
        let row = self
            .store
            .get_tree_row(id)
            .await
            .map_err(backend_context("fetch tree details"))?;

        match row {
            Some(row) => Ok(mapper::to_tree(row)),
            None => seed::example_tree(id)
                .ok_or_else(|| AppError::NotFound("Tree not found".to_string())),
        }
    }

    /// Validate and insert a tree, uploading its image first unless deferred.
    /// An image that fails to upload does not stop the record being created.
    pub async fn add_tree(
        &self,
        input: TreeFormInput,
        image: Option<ImageFile>,
    ) -> Result<AddTreeOutcome, AppError> {
        let mut new_row = validate_form(&input)?;

        let image = image.filter(|_| !input.skip_image_upload);
        if let Some(file) = &image {
            self.images.validate(file)?;
        }

        let mut image_error = None;
        if let Some(file) = &image {
            match self.images.upload(file).await {
                Ok(url) => new_row.image_url = Some(url),
                Err(e) => {
                    tracing::warn!(
                        "Image upload failed for {}, creating without image: {}",
                        new_row.scientific_name,
                        e
                    );
                    image_error = Some(e.message());
                }
            }
        }

        let row = match self.store.insert_tree_row(&new_row).await {
            Ok(row) => row,
            Err(e) => {
                if let Some(url) = &new_row.image_url {
                    self.images.discard(url).await;
                }
                return Err(backend_context("add tree")(e));
            }
        };

        tracing::info!("Added tree {} ({})", row.id, row.scientific_name);

        Ok(AddTreeOutcome {
            tree: mapper::to_tree(row),
            image_error,
        })
    }

    /// Delete a tree and, best effort, its stored image.
    pub async fn delete_tree(&self, id: &str) -> Result<bool, AppError> {
        let row = self
            .store
            .get_tree_row(id)
            .await
            .map_err(backend_context("delete tree"))?
            .ok_or_else(|| AppError::NotFound("Tree not found".to_string()))?;

        if let Some(url) = row.image_url.as_deref().filter(|u| !u.is_empty()) {
            self.images.discard(url).await;
        }

        let deleted = self
            .store
            .delete_tree_row(id)
            .await
            .map_err(backend_context("delete tree"))?;

        if !deleted {
            return Err(AppError::NotFound("Tree not found".to_string()));
        }

        tracing::info!("Deleted tree {} ({})", id, row.scientific_name);
        Ok(true)
    }

    /// Replace a tree's image.
    pub async fn replace_image(&self, id: &str, file: &ImageFile) -> Result<Tree, AppError> {
        self.images
            .replace(id, file)
            .await
            .map_err(backend_context("upload image"))
    }

    /// Insert the predefined species one at a time, skipping failures.
    pub async fn add_predefined_batch(&self) -> Result<BatchOutcome, AppError> {
        let rows = seed::predefined_rows();
        let attempted = rows.len();
        let mut trees = Vec::with_capacity(attempted);

        for row in &rows {
            match self.store.insert_tree_row(row).await {
                Ok(inserted) => trees.push(mapper::to_tree(inserted)),
                Err(e) => tracing::warn!(
                    "Skipping predefined tree {}: {}",
                    row.scientific_name,
                    e
                ),
            }
        }

        if trees.is_empty() {
            return Err(AppError::Backend(
                "Failed to add predefined trees".to_string(),
            ));
        }

        tracing::info!(
            "Added {} of {} predefined trees",
            trees.len(),
            attempted
        );

        Ok(BatchOutcome { trees, attempted })
    }
}

/// Keep the first tree seen for each scientific name, preserving order.
pub fn dedupe_by_scientific_name(trees: Vec<Tree>) -> Vec<Tree> {
    let mut seen = HashSet::new();
    trees
        .into_iter()
        .filter(|tree| seen.insert(tree.scientific_name.clone()))
        .collect()
}

/// Check required fields and normalise optional ones into an insertable row.
fn validate_form(input: &TreeFormInput) -> Result<NewTreeRow, AppError> {
    let scientific_name = input.scientific_name.trim();
    if scientific_name.is_empty() {
        return Err(AppError::validation(
            "scientificName",
            "Please enter the scientific name",
        ));
    }

    let family = input.family.trim();
    if family.is_empty() {
        return Err(AppError::validation("family", "Please enter the tree family"));
    }

    if let Some(species) = input.species.as_deref().map(str::trim) {
        if !species.is_empty() && species != scientific_name {
            return Err(AppError::validation(
                "species",
                "Species must match the scientific name",
            ));
        }
    }

    let location = input.location.trim();
    if location.is_empty() {
        return Err(AppError::validation("location", "Please enter the tree location"));
    }

    Ok(NewTreeRow {
        scientific_name: scientific_name.to_string(),
        family: family.to_string(),
        common_name_english: input
            .common_name_english
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        common_name_malayalam: non_blank(&input.common_name_malayalam),
        native_range: non_blank(&input.native_range),
        location: location.to_string(),
        description: non_blank(&input.description),
        image_url: None,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Log backend detail and replace it with "Failed to <action>".
fn backend_context(action: &'static str) -> impl Fn(AppError) -> AppError {
    move |err| match err {
        AppError::Backend(detail) => {
            tracing::error!("Failed to {}: {}", action, detail);
            AppError::Backend(format!("Failed to {}", action))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::images::DEFAULT_MAX_IMAGE_BYTES;
    use crate::storage::{ObjectStorage, TREES_BUCKET};
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    struct Fixture {
        repo: TreeRepository,
        pool: SqlitePool,
        temp_dir: TempDir,
    }

    async fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let store = Store::new(pool.clone());
        let storage = ObjectStorage::open(&temp_dir.path().join("storage"), TREES_BUCKET, "http://host")
            .await
            .unwrap();
        let images = ImagePipeline::new(store.clone(), storage, DEFAULT_MAX_IMAGE_BYTES);

        Fixture {
            repo: TreeRepository::new(store, images),
            pool,
            temp_dir,
        }
    }

    fn ficus_input() -> TreeFormInput {
        TreeFormInput {
            scientific_name: "Ficus religiosa".to_string(),
            family: "Moraceae".to_string(),
            common_name_english: Some("Sacred fig".to_string()),
            species: Some("Ficus religiosa".to_string()),
            location: "EMEA College".to_string(),
            description: Some("Planted by the first graduating class.".to_string()),
            ..Default::default()
        }
    }

    fn jpeg(size: usize) -> ImageFile {
        ImageFile {
            file_name: "bark.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xff; size],
        }
    }

    fn blob_count(temp_dir: &TempDir) -> usize {
        std::fs::read_dir(temp_dir.path().join("storage").join(TREES_BUCKET))
            .unwrap()
            .count()
    }

    #[tokio::test]
    async fn test_add_tree_without_image_is_pending() {
        let f = fixture().await;

        let outcome = f.repo.add_tree(ficus_input(), None).await.unwrap();

        assert!(outcome.image_error.is_none());
        assert!(outcome.tree.pending_image);
        assert_eq!(outcome.tree.image_url, "");
        assert_eq!(outcome.tree.scientific_name, "Ficus religiosa");
        assert_eq!(outcome.tree.species, "Ficus religiosa");
        assert_eq!(outcome.tree.family, "Moraceae");
        assert_eq!(outcome.tree.location, "EMEA College");
        assert_eq!(outcome.tree.common_name_english, "Sacred fig");
        assert_eq!(
            outcome.tree.description,
            "Planted by the first graduating class."
        );
        assert_eq!(outcome.tree.added_date, mapper::today());
    }

    #[tokio::test]
    async fn test_add_tree_round_trips_through_store() {
        let f = fixture().await;

        let created = f
            .repo
            .add_tree(ficus_input(), Some(jpeg(64)))
            .await
            .unwrap()
            .tree;
        let fetched = f.repo.get_tree(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert!(!fetched.pending_image);
        assert!(fetched.image_url.starts_with("http://host/storage/trees/"));
        assert_eq!(blob_count(&f.temp_dir), 1);
    }

    #[tokio::test]
    async fn test_skip_image_upload_defers_image() {
        let f = fixture().await;
        let input = TreeFormInput {
            skip_image_upload: true,
            ..ficus_input()
        };

        let outcome = f.repo.add_tree(input, Some(jpeg(64))).await.unwrap();

        assert!(outcome.tree.pending_image);
        assert_eq!(blob_count(&f.temp_dir), 0);
    }

    #[tokio::test]
    async fn test_failed_upload_still_creates_tree() {
        let f = fixture().await;
        // Storage bucket replaced by a plain file: every upload fails
        let bucket = f.temp_dir.path().join("storage").join(TREES_BUCKET);
        std::fs::remove_dir_all(&bucket).unwrap();
        std::fs::write(&bucket, b"not a directory").unwrap();

        let outcome = f.repo.add_tree(ficus_input(), Some(jpeg(64))).await.unwrap();

        assert!(outcome.image_error.is_some());
        assert!(outcome.warning().unwrap().starts_with("Tree added"));
        assert!(outcome.tree.pending_image);
        assert_eq!(f.repo.list_trees().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_rejects_missing_fields() {
        let f = fixture().await;

        let cases = [
            (TreeFormInput { scientific_name: " ".into(), ..ficus_input() }, "scientificName"),
            (TreeFormInput { family: String::new(), ..ficus_input() }, "family"),
            (TreeFormInput { location: String::new(), ..ficus_input() }, "location"),
            (TreeFormInput { species: Some("Ficus benghalensis".into()), ..ficus_input() }, "species"),
        ];

        for (input, expected_field) in cases {
            match f.repo.add_tree(input, None).await {
                Err(AppError::Validation { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected validation error on {}, got {:?}", expected_field, other),
            }
        }

        // Nothing reached the store
        assert_eq!(f.repo.list_trees().await.unwrap(), seed::example_trees());
    }

    #[tokio::test]
    async fn test_invalid_image_rejected_before_insert() {
        let f = fixture().await;

        let err = f
            .repo
            .add_tree(ficus_input(), Some(jpeg(6 * 1024 * 1024)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "image"));
        assert_eq!(blob_count(&f.temp_dir), 0);
    }

    #[tokio::test]
    async fn test_empty_catalog_falls_back_to_examples() {
        let f = fixture().await;

        let trees = f.repo.list_trees().await.unwrap();
        assert_eq!(trees, seed::example_trees());
    }

    #[tokio::test]
    async fn test_backend_error_is_not_masked_by_fallback() {
        let f = fixture().await;
        f.pool.close().await;

        let err = f.repo.list_trees().await.unwrap_err();
        assert_eq!(err, AppError::Backend("Failed to fetch trees".to_string()));
    }

    #[tokio::test]
    async fn test_list_dedupes_by_scientific_name() {
        let f = fixture().await;
        let first = f.repo.add_tree(ficus_input(), None).await.unwrap().tree;
        f.repo
            .add_tree(
                TreeFormInput {
                    scientific_name: "Mangifera indica".into(),
                    family: "Anacardiaceae".into(),
                    species: None,
                    ..ficus_input()
                },
                None,
            )
            .await
            .unwrap();
        f.repo
            .add_tree(
                TreeFormInput {
                    location: "Library Lawn".into(),
                    ..ficus_input()
                },
                None,
            )
            .await
            .unwrap();

        let trees = f.repo.list_trees().await.unwrap();
        let names: Vec<_> = trees.iter().map(|t| t.scientific_name.as_str()).collect();

        assert_eq!(names, vec!["Ficus religiosa", "Mangifera indica"]);
        assert_eq!(trees[0].id, first.id);
        assert_eq!(trees[0].location, "EMEA College");
    }

    #[tokio::test]
    async fn test_get_tree_falls_back_then_not_found() {
        let f = fixture().await;

        assert_eq!(f.repo.get_tree("2").await.unwrap().scientific_name, "Acer palmatum");

        let err = f.repo.get_tree("nonexistent-id").await.unwrap_err();
        assert_eq!(err, AppError::NotFound("Tree not found".to_string()));
    }

    #[tokio::test]
    async fn test_delete_tree_removes_image() {
        let f = fixture().await;
        let tree = f
            .repo
            .add_tree(ficus_input(), Some(jpeg(32)))
            .await
            .unwrap()
            .tree;
        assert_eq!(blob_count(&f.temp_dir), 1);

        assert!(f.repo.delete_tree(&tree.id).await.unwrap());
        assert_eq!(blob_count(&f.temp_dir), 0);
        assert!(matches!(
            f.repo.delete_tree(&tree.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    /// Swap a stored blob for a non-empty directory so removing it fails.
    fn make_blob_unremovable(temp_dir: &TempDir, image_url: &str) {
        let name = image_url.rsplit('/').next().unwrap();
        let blob = temp_dir
            .path()
            .join("storage")
            .join(TREES_BUCKET)
            .join(name);
        std::fs::remove_file(&blob).unwrap();
        std::fs::create_dir(&blob).unwrap();
        std::fs::write(blob.join("keep"), b"x").unwrap();
    }

    #[tokio::test]
    async fn test_delete_survives_failed_image_removal() {
        let f = fixture().await;
        let tree = f
            .repo
            .add_tree(ficus_input(), Some(jpeg(32)))
            .await
            .unwrap()
            .tree;
        make_blob_unremovable(&f.temp_dir, &tree.image_url);

        assert!(f.repo.delete_tree(&tree.id).await.unwrap());

        assert!(matches!(
            f.repo.get_tree(&tree.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_survives_failed_old_image_removal() {
        let f = fixture().await;
        let tree = f
            .repo
            .add_tree(ficus_input(), Some(jpeg(32)))
            .await
            .unwrap()
            .tree;
        make_blob_unremovable(&f.temp_dir, &tree.image_url);

        let updated = f.repo.replace_image(&tree.id, &jpeg(48)).await.unwrap();

        assert!(!updated.pending_image);
        assert_ne!(updated.image_url, tree.image_url);
        assert_eq!(f.repo.get_tree(&tree.id).await.unwrap().image_url, updated.image_url);
    }

    #[tokio::test]
    async fn test_replace_image_supersedes_old_blob() {
        let f = fixture().await;
        let tree = f
            .repo
            .add_tree(ficus_input(), Some(jpeg(32)))
            .await
            .unwrap()
            .tree;

        let updated = f.repo.replace_image(&tree.id, &jpeg(48)).await.unwrap();

        assert!(!updated.pending_image);
        assert_ne!(updated.image_url, tree.image_url);
        assert_eq!(updated.id, tree.id);
        assert_eq!(blob_count(&f.temp_dir), 1);
    }

    #[tokio::test]
    async fn test_predefined_batch_inserts_all() {
        let f = fixture().await;

        let outcome = f.repo.add_predefined_batch().await.unwrap();

        assert_eq!(outcome.attempted, 70);
        assert_eq!(outcome.trees.len(), 70);
        assert!(outcome.warning().is_none());
    }

    #[tokio::test]
    async fn test_predefined_batch_skips_failed_inserts() {
        let f = fixture().await;
        sqlx::query(
            r#"CREATE TRIGGER reject_three BEFORE INSERT ON trees
               WHEN NEW.scientific_name IN ('Cocos nucifera', 'Santalum album', 'Areca catechu')
               BEGIN SELECT RAISE(ABORT, 'rejected'); END;"#,
        )
        .execute(&f.pool)
        .await
        .unwrap();

        let outcome = f.repo.add_predefined_batch().await.unwrap();

        assert_eq!(outcome.trees.len(), 67);
        assert_eq!(outcome.failed(), 3);
        assert_eq!(
            outcome.warning().unwrap(),
            "Added 67 of 70 predefined trees; 3 failed"
        );
    }

    #[test]
    fn test_dedupe_keeps_first_in_order() {
        let mut trees = seed::example_trees();
        let mut duplicate = trees[0].clone();
        duplicate.id = "dup".to_string();
        trees.insert(2, duplicate);

        let deduped = dedupe_by_scientific_name(trees);

        assert_eq!(deduped, seed::example_trees());
    }
}
