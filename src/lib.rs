//! Facade crate for the Wallery wallpaper catalog.
//!
//! This crate re-exports the core domain types and exposes the search and
//! recommendation scorers and the SQLite store behind feature flags.

#![forbid(unsafe_code)]

pub use wallery_core::{
    CachedStore, Category, Clock, Collection, DecodeError, Document, MatchScore,
    PopularityWeights, Scorer, SearchQuery, SystemClock, TaggedCache, Wallpaper, WallpaperStore,
    most_popular, rank_by_popularity,
};

#[cfg(feature = "store-sqlite")]
pub use wallery_core::{SqliteWallpaperStore, SqliteWallpaperStoreError};

#[cfg(feature = "scorer")]
pub use wallery_scorer::{
    CatalogSearch, FuzzyScorer, RelatedScorer, RelatedWeights, SearchOutcome, SearchWeights,
    related_wallpapers, search,
};
