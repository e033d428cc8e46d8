//! Search and recommendation scoring for the Wallery catalog.
//!
//! The crate provides two pure ranking routines over an in-memory snapshot
//! of wallpapers:
//! - **Fuzzy search** ([`FuzzyScorer`], [`search`]) awards points for exact
//!   tag, category and title-word hits, for near misses within a
//!   Levenshtein tolerance, and for description substrings. When nothing
//!   scores it falls back to wallpapers whose tags contain a query term.
//! - **Related wallpapers** ([`RelatedScorer`], [`related_wallpapers`])
//!   ranks by shared tags and a same-category bonus, breaks ties by
//!   popularity and falls back to the most popular wallpapers.
//!
//! [`CatalogSearch`] wires both to any
//! [`WallpaperStore`](wallery_core::WallpaperStore).
//!
//! # Examples
//!
//! ```
//! use wallery_core::Wallpaper;
//! use wallery_scorer::search;
//!
//! let snapshot = vec![
//!     Wallpaper::new("w1").with_tags(["ocean"]).with_description("calm sea"),
//!     Wallpaper::new("w2").with_description("an ocean at dusk"),
//! ];
//! let outcome = search("ocean", &snapshot);
//! assert_eq!(outcome.results[0].id, "w1");
//! assert!(outcome.has_exact_matches);
//! ```

#![forbid(unsafe_code)]

mod levenshtein;
mod related;
mod search;
mod service;
mod weights;


pub use levenshtein::levenshtein;
pub use related::{RelatedScorer, related_wallpapers};
pub use search::{FuzzyScorer, SearchOutcome, rank_matches, search};
pub use service::CatalogSearch;
pub use weights::{RelatedWeights, SearchWeights};
