//! Core domain types for the Wallery wallpaper catalog.
//!
//! The crate owns the catalog model ([`Wallpaper`], [`Category`],
//! [`Collection`]), the forgiving decoder for document-database exports, the
//! site-wide popularity weighting, and the seams the rest of the workspace
//! plugs into: [`Scorer`] for query relevance and [`WallpaperStore`] for
//! snapshot access. Scoring code treats every snapshot as read-only; all
//! mutation lives in `wallery-data`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cache;
mod catalog;
pub mod document;
mod popularity;
mod scorer;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod wallpaper;

pub use cache::{Clock, SystemClock, TaggedCache};
pub use catalog::{Category, Collection};
pub use document::{DecodeError, Document};
pub use popularity::{PopularityWeights, most_popular, rank_by_popularity};
pub use scorer::{MatchScore, Scorer, SearchQuery};
pub use store::{CachedStore, WALLPAPERS_TAG, WallpaperStore};
pub use wallpaper::Wallpaper;

#[cfg(feature = "store-sqlite")]
pub use store::{CATALOG_SCHEMA, SqliteWallpaperStore, SqliteWallpaperStoreError};
