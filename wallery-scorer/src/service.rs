//! Store-backed search and recommendation entry points.

use log::debug;
use wallery_core::{Wallpaper, WallpaperStore};

use crate::related::{RelatedScorer, exclusion_set};
use crate::search::{FuzzyScorer, SearchOutcome};

/// Runs search and recommendations against snapshots read from a store.
///
/// Every call reads a fresh snapshot; wrap the store in a
/// [`CachedStore`](wallery_core::CachedStore) to reuse one between calls.
///
/// # Examples
///
/// ```
/// use wallery_core::Wallpaper;
/// use wallery_core::test_support::MemoryStore;
/// use wallery_scorer::CatalogSearch;
///
/// let store = MemoryStore::with_wallpapers([
///     Wallpaper::new("w1").with_category("Nature").with_tags(["sky"]),
/// ]);
/// let catalog = CatalogSearch::new(store);
/// let outcome = catalog.search_wallpapers("sky")?;
/// assert_eq!(outcome.results.len(), 1);
/// # Ok::<(), std::convert::Infallible>(())
/// ```
#[derive(Debug)]
pub struct CatalogSearch<S> {
    store: S,
    fuzzy: FuzzyScorer,
    related: RelatedScorer,
}

impl<S: WallpaperStore> CatalogSearch<S> {
    /// Serve requests from `store` with the default weights.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_scorers(store, FuzzyScorer::default(), RelatedScorer::default())
    }

    /// Serve requests from `store` with custom scorers.
    #[must_use]
    pub const fn with_scorers(store: S, fuzzy: FuzzyScorer, related: RelatedScorer) -> Self {
        Self {
            store,
            fuzzy,
            related,
        }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Rank the catalog against a free-text query.
    ///
    /// A blank query returns an empty outcome without reading the store.
    ///
    /// # Errors
    ///
    /// Propagates the store's error when the snapshot cannot be read.
    pub fn search_wallpapers(&self, query: &str) -> Result<SearchOutcome, S::Error> {
        if query.trim().is_empty() {
            return Ok(SearchOutcome::default());
        }
        let snapshot = self.store.all_wallpapers()?;
        Ok(self.fuzzy.search(query, &snapshot))
    }

    /// Wallpapers related to `current`, or the most popular ones when none are.
    ///
    /// The popular fallback asks the store for `limit + exclude_ids.len()`
    /// wallpapers so that removing excluded ids still leaves up to `limit`.
    ///
    /// # Errors
    ///
    /// Propagates the store's error when a snapshot cannot be read.
    pub fn more_related_wallpapers<T: AsRef<str>>(
        &self,
        current: &Wallpaper,
        limit: usize,
        exclude_ids: &[T],
    ) -> Result<Vec<Wallpaper>, S::Error> {
        let snapshot = self.store.all_wallpapers()?;
        let related = self.related.related(current, &snapshot, limit, exclude_ids);
        if !related.is_empty() {
            debug!("found {} wallpapers related to {}", related.len(), current.id);
            return Ok(related);
        }

        debug!("no wallpapers related to {}; using popular fallback", current.id);
        let excluded = exclusion_set(exclude_ids);
        let mut popular = self
            .store
            .popular_wallpapers(limit.saturating_add(exclude_ids.len()))?;
        popular.retain(|wallpaper| !excluded.contains(wallpaper.id.as_str()));
        popular.truncate(limit);
        Ok(popular)
    }
}
