//! Tree directory: the fetched tree list, the active filters, and the
//! subset and facets derived from them.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Tree;
use crate::repository::TreeRepository;

/// Active filters. `None` or blank values match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_query: Option<String>,
    pub species: Option<String>,
    pub location: Option<String>,
    pub family: Option<String>,
}

/// A partial filter change; keys that are present replace the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub search_query: Option<String>,
    pub species: Option<String>,
    pub location: Option<String>,
    pub family: Option<String>,
}

impl FilterCriteria {
    /// True when every non-wildcard criterion holds for `tree`.
    pub fn matches(&self, tree: &Tree) -> bool {
        if let Some(query) = active(&self.search_query) {
            let query = query.to_lowercase();
            let haystacks = [
                Some(tree.name.as_str()),
                Some(tree.scientific_name.as_str()),
                Some(tree.species.as_str()),
                Some(tree.description.as_str()),
                Some(tree.common_name_english.as_str()),
                tree.common_name_malayalam.as_deref(),
            ];
            let found = haystacks
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&query));
            if !found {
                return false;
            }
        }

        exact(&self.species, &tree.species)
            && exact(&self.location, &tree.location)
            && exact(&self.family, &tree.family)
    }

    /// Shallow merge; later keys win.
    pub fn merge(&mut self, update: FilterUpdate) {
        if update.search_query.is_some() {
            self.search_query = update.search_query;
        }
        if update.species.is_some() {
            self.species = update.species;
        }
        if update.location.is_some() {
            self.location = update.location;
        }
        if update.family.is_some() {
            self.family = update.family;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_wildcard(&self) -> bool {
        [&self.search_query, &self.species, &self.location, &self.family]
            .into_iter()
            .all(|c| active(c).is_none())
    }
}

fn active(criterion: &Option<String>) -> Option<&str> {
    criterion.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn exact(criterion: &Option<String>, value: &str) -> bool {
    match active(criterion) {
        Some(wanted) => wanted.to_lowercase() == value.trim().to_lowercase(),
        None => true,
    }
}

/// Distinct values present in the full list, sorted as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub species: Vec<String>,
    pub locations: Vec<String>,
    pub families: Vec<String>,
}

impl Facets {
    pub fn from_trees(trees: &[Tree]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
            values
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        }

        Self {
            species: distinct(trees.iter().map(|t| t.species.as_str())),
            locations: distinct(trees.iter().map(|t| t.location.as_str())),
            families: distinct(trees.iter().map(|t| t.family.as_str())),
        }
    }
}

/// Filter state over one fetched list.
#[derive(Debug, Clone, Default)]
pub struct TreeDirectory {
    all_trees: Vec<Tree>,
    criteria: FilterCriteria,
    visible: Vec<Tree>,
    facets: Facets,
}

impl TreeDirectory {
    pub fn new(trees: Vec<Tree>) -> Self {
        let mut directory = Self::default();
        directory.set_trees(trees);
        directory
    }

    /// Replace the list wholesale. Facets are only recomputed here.
    pub fn set_trees(&mut self, trees: Vec<Tree>) {
        self.facets = Facets::from_trees(&trees);
        self.all_trees = trees;
        self.recompute();
    }

    pub fn update_filters(&mut self, update: FilterUpdate) {
        self.criteria.merge(update);
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.recompute();
    }

    pub fn all_trees(&self) -> &[Tree] {
        &self.all_trees
    }

    pub fn visible_trees(&self) -> &[Tree] {
        &self.visible
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    fn recompute(&mut self) {
        self.visible = self
            .all_trees
            .iter()
            .filter(|tree| self.criteria.matches(tree))
            .cloned()
            .collect();
    }
}

/// One filtered view of the shared list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryPage {
    pub trees: Vec<Tree>,
    pub total: usize,
    pub criteria: FilterCriteria,
    pub facets: Facets,
}

impl From<&TreeDirectory> for DirectoryPage {
    fn from(directory: &TreeDirectory) -> Self {
        Self {
            trees: directory.visible_trees().to_vec(),
            total: directory.all_trees().len(),
            criteria: directory.criteria().clone(),
            facets: directory.facets().clone(),
        }
    }
}

impl From<FilterCriteria> for FilterUpdate {
    fn from(criteria: FilterCriteria) -> Self {
        Self {
            search_query: criteria.search_query,
            species: criteria.species,
            location: criteria.location,
            family: criteria.family,
        }
    }
}

struct Snapshot {
    generation: u64,
    loaded: bool,
    directory: TreeDirectory,
}

/// Process-wide list cache. Refreshes may overlap; each takes a ticket and
/// only a result newer than the last applied one replaces the list.
pub struct SharedDirectory {
    next_ticket: AtomicU64,
    snapshot: RwLock<Snapshot>,
}

impl Default for SharedDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedDirectory {
    pub fn new() -> Self {
        Self {
            next_ticket: AtomicU64::new(0),
            snapshot: RwLock::new(Snapshot {
                generation: 0,
                loaded: false,
                directory: TreeDirectory::default(),
            }),
        }
    }

    /// Take the next generation ticket.
    pub fn ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a fetched list if `ticket` is newer than the current one.
    /// Returns whether it was applied.
    pub async fn apply(&self, ticket: u64, trees: Vec<Tree>) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if ticket <= snapshot.generation {
            tracing::debug!(
                "Dropping stale tree list (ticket {}, current {})",
                ticket,
                snapshot.generation
            );
            return false;
        }

        snapshot.directory = TreeDirectory::new(trees);
        snapshot.generation = ticket;
        snapshot.loaded = true;
        true
    }

    /// Re-fetch the full list from the repository.
    pub async fn refresh(&self, repo: &TreeRepository) -> Result<(), AppError> {
        let ticket = self.ticket();
        let trees = repo.list_trees().await?;
        let count = trees.len();
        if self.apply(ticket, trees).await {
            tracing::debug!("Directory refreshed with {} trees (generation {})", count, ticket);
        }
        Ok(())
    }

    /// Refresh after a mutation; failure only leaves the list stale.
    pub async fn refresh_quietly(&self, repo: &TreeRepository) {
        if let Err(e) = self.refresh(repo).await {
            tracing::warn!("Directory refresh failed, list may be stale: {}", e);
        }
    }

    /// Filtered view of the current list, loading it on first use.
    pub async fn view(
        &self,
        repo: &TreeRepository,
        criteria: FilterCriteria,
        force_refresh: bool,
    ) -> Result<DirectoryPage, AppError> {
        let loaded = self.snapshot.read().await.loaded;
        if force_refresh || !loaded {
            self.refresh(repo).await?;
        }

        let mut directory = self.snapshot.read().await.directory.clone();
        if criteria.is_wildcard() {
            directory.clear_filters();
        } else {
            directory.update_filters(criteria.into());
        }
        Ok(DirectoryPage::from(&directory))
    }

    #[cfg(test)]
    async fn all_trees(&self) -> Vec<Tree> {
        self.snapshot.read().await.directory.all_trees().to_vec()
    }

    #[cfg(test)]
    async fn generation(&self) -> u64 {
        self.snapshot.read().await.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn tree(id: &str, scientific_name: &str, family: &str, location: &str) -> Tree {
        Tree {
            id: id.to_string(),
            name: scientific_name.to_string(),
            scientific_name: scientific_name.to_string(),
            family: family.to_string(),
            common_name_english: String::new(),
            common_name_malayalam: None,
            native_range: None,
            species: scientific_name.to_string(),
            location: location.to_string(),
            description: String::new(),
            image_url: String::new(),
            added_date: "2024-01-01".to_string(),
            pending_image: true,
        }
    }

    fn campus() -> Vec<Tree> {
        vec![
            tree("a", "Mangifera indica", "Anacardiaceae", "Main Gate"),
            tree("b", "Ficus religiosa", "Moraceae", "EMEA College"),
            tree("c", "Tectona grandis", "Lamiaceae", "EMEA College"),
            tree("d", "Azadirachta indica", "Meliaceae", "Library Lawn"),
            tree("e", "Ficus benghalensis", "Moraceae", "Main Gate"),
        ]
    }

    fn species(name: &str) -> FilterUpdate {
        FilterUpdate {
            species: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_species_filter_selects_one() {
        let mut directory = TreeDirectory::new(campus());

        directory.update_filters(species("Mangifera indica"));

        assert_eq!(directory.visible_trees().len(), 1);
        assert_eq!(directory.visible_trees()[0].id, "a");
    }

    #[test]
    fn test_exact_filters_ignore_case() {
        let mut directory = TreeDirectory::new(campus());

        directory.update_filters(FilterUpdate {
            location: Some("emea college".to_string()),
            ..Default::default()
        });

        assert_eq!(directory.visible_trees().len(), 2);
    }

    #[test]
    fn test_search_query_matches_common_names() {
        let mut trees = campus();
        trees[3].common_name_english = "Neem".to_string();
        trees[1].common_name_malayalam = Some("അരയാൽ".to_string());
        let mut directory = TreeDirectory::new(trees);

        directory.update_filters(FilterUpdate {
            search_query: Some("NEEM".to_string()),
            ..Default::default()
        });
        assert_eq!(directory.visible_trees()[0].id, "d");

        directory.update_filters(FilterUpdate {
            search_query: Some("അരയാൽ".to_string()),
            ..Default::default()
        });
        assert_eq!(directory.visible_trees()[0].id, "b");
    }

    #[test]
    fn test_adding_criteria_never_grows_result() {
        let steps = [
            FilterUpdate {
                search_query: Some("ficus".to_string()),
                ..Default::default()
            },
            FilterUpdate {
                family: Some("Moraceae".to_string()),
                ..Default::default()
            },
            FilterUpdate {
                location: Some("Main Gate".to_string()),
                ..Default::default()
            },
            species("Ficus religiosa"),
        ];

        let mut directory = TreeDirectory::new(campus());
        let mut previous = directory.visible_trees().len();
        for step in steps {
            directory.update_filters(step);
            let current = directory.visible_trees().len();
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_clear_filters_shows_everything() {
        let mut directory = TreeDirectory::new(campus());
        directory.update_filters(species("Tectona grandis"));
        directory.update_filters(FilterUpdate {
            search_query: Some("teak".to_string()),
            ..Default::default()
        });

        directory.clear_filters();

        assert!(directory.criteria().is_wildcard());
        assert_eq!(directory.visible_trees(), directory.all_trees());
    }

    #[test]
    fn test_later_keys_win_and_blank_is_wildcard() {
        let mut directory = TreeDirectory::new(campus());
        directory.update_filters(species("Mangifera indica"));
        directory.update_filters(species("Ficus religiosa"));
        assert_eq!(directory.visible_trees()[0].id, "b");

        directory.update_filters(species("  "));
        assert_eq!(directory.visible_trees().len(), 5);
    }

    #[test]
    fn test_facets_sorted_and_distinct() {
        let directory = TreeDirectory::new(campus());

        assert_eq!(
            directory.facets().locations,
            vec!["EMEA College", "Library Lawn", "Main Gate"]
        );
        assert_eq!(
            directory.facets().families,
            vec!["Anacardiaceae", "Lamiaceae", "Meliaceae", "Moraceae"]
        );
        assert_eq!(directory.facets().species.len(), 5);
    }

    #[test]
    fn test_facets_ignore_filters() {
        let mut directory = TreeDirectory::new(campus());
        let before = directory.facets().clone();

        directory.update_filters(species("Mangifera indica"));

        assert_eq!(directory.facets(), &before);
    }

    #[tokio::test]
    async fn test_stale_refresh_is_dropped() {
        let shared = SharedDirectory::new();
        let older = shared.ticket();
        let newer = shared.ticket();

        assert!(shared.apply(newer, campus()).await);
        assert!(!shared.apply(older, seed::example_trees()).await);

        assert_eq!(shared.generation().await, newer);
        assert_eq!(shared.all_trees().await, campus());
    }
}
