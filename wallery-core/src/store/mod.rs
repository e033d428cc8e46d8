//! Read access to the wallpaper catalog.
//!
//! The `WallpaperStore` trait defines the read-only interface search and
//! recommendation pipelines consume. Backends return owned snapshots so
//! scoring never holds a lock or a connection.

use crate::{PopularityWeights, Wallpaper, most_popular};

mod cached;
#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use cached::{CachedStore, WALLPAPERS_TAG};
#[cfg(feature = "store-sqlite")]
pub use schema::CATALOG_SCHEMA;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteWallpaperStore, SqliteWallpaperStoreError};

/// Read-only access to persisted wallpapers.
///
/// Only [`all_wallpapers`](Self::all_wallpapers) is required. The provided
/// methods derive their answers from the full snapshot; backends with an
/// index should override them.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use wallery_core::{Wallpaper, WallpaperStore};
///
/// struct Fixed(Vec<Wallpaper>);
///
/// impl WallpaperStore for Fixed {
///     type Error = Infallible;
///
///     fn all_wallpapers(&self) -> Result<Vec<Wallpaper>, Self::Error> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let store = Fixed(vec![
///     Wallpaper::new("quiet").with_engagement(0, 0, 1),
///     Wallpaper::new("loud").with_engagement(9, 0, 0),
/// ]);
/// let popular = store.popular_wallpapers(1).unwrap();
/// assert_eq!(popular[0].id, "loud");
/// ```
pub trait WallpaperStore: Send + Sync {
    /// Failure raised by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return every published wallpaper.
    fn all_wallpapers(&self) -> Result<Vec<Wallpaper>, Self::Error>;

    /// Return the `count` most popular wallpapers using the default
    /// [`PopularityWeights`], most popular first.
    fn popular_wallpapers(&self, count: usize) -> Result<Vec<Wallpaper>, Self::Error> {
        Ok(most_popular(
            self.all_wallpapers()?,
            count,
            PopularityWeights::default(),
        ))
    }

    /// Look up a single wallpaper by identifier.
    fn wallpaper(&self, id: &str) -> Result<Option<Wallpaper>, Self::Error> {
        Ok(self
            .all_wallpapers()?
            .into_iter()
            .find(|wallpaper| wallpaper.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::WallpaperStore;
    use crate::test_support::{MemoryStore, wallpaper};
    use rstest::rstest;

    #[rstest]
    fn popular_orders_by_weighted_engagement() {
        let store = MemoryStore::with_wallpapers([
            wallpaper("views", "Nature", &[]).with_engagement(0, 0, 14),
            wallpaper("likes", "Nature", &[]).with_engagement(0, 4, 0),
            wallpaper("downloads", "Nature", &[]).with_engagement(3, 0, 0),
        ]);
        let popular = store.popular_wallpapers(2).expect("memory store");
        let ids: Vec<_> = popular.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["downloads", "views"]);
    }

    #[rstest]
    fn popular_with_zero_count_is_empty() {
        let store = MemoryStore::with_wallpapers([wallpaper("a", "Nature", &[])]);
        assert!(store.popular_wallpapers(0).expect("memory store").is_empty());
    }

    #[rstest]
    #[case("b", true)]
    #[case("missing", false)]
    fn wallpaper_lookup(#[case] id: &str, #[case] found: bool) {
        let store = MemoryStore::with_wallpapers([
            wallpaper("a", "Nature", &[]),
            wallpaper("b", "City", &[]),
        ]);
        let result = store.wallpaper(id).expect("memory store");
        assert_eq!(result.is_some(), found);
    }
}
