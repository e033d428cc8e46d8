//! Test-only helpers shared by unit and behaviour tests: an in-memory
//! `WallpaperStore`, a fixture builder, a controllable clock and a SQLite
//! catalog writer.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::cache::Clock;
use crate::{Wallpaper, WallpaperStore};

/// In-memory `WallpaperStore` implementation used in tests.
///
/// Wallpapers are returned in insertion order.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    wallpapers: Vec<Wallpaper>,
}

impl MemoryStore {
    /// Create a store from a collection of wallpapers.
    #[must_use]
    pub fn with_wallpapers<I>(wallpapers: I) -> Self
    where
        I: IntoIterator<Item = Wallpaper>,
    {
        Self {
            wallpapers: wallpapers.into_iter().collect(),
        }
    }

    /// Append a wallpaper.
    pub fn push(&mut self, wallpaper: Wallpaper) {
        self.wallpapers.push(wallpaper);
    }
}

impl WallpaperStore for MemoryStore {
    type Error = Infallible;

    fn all_wallpapers(&self) -> Result<Vec<Wallpaper>, Self::Error> {
        Ok(self.wallpapers.clone())
    }
}

/// Build an untitled wallpaper with a category and tags.
#[must_use]
pub fn wallpaper(id: &str, category: &str, tags: &[&str]) -> Wallpaper {
    Wallpaper::new(id)
        .with_category(category)
        .with_tags(tags.iter().copied())
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }
}

impl ManualClock {
    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        self.origin + elapsed
    }
}

/// Create a catalog database at `path` containing `wallpapers`.
///
/// # Errors
///
/// Returns any error reported by SQLite or by JSON encoding of the tags.
#[cfg(feature = "store-sqlite")]
pub fn write_sqlite_catalog(
    path: &std::path::Path,
    wallpapers: &[Wallpaper],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut connection = rusqlite::Connection::open(path)?;
    connection.execute_batch(crate::CATALOG_SCHEMA)?;
    let transaction = connection.transaction()?;
    {
        let mut insert = transaction.prepare(
            "INSERT INTO wallpapers (id, title, description, category, tags, image_url, \
             downloads, likes, views, premium, is_exclusive, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;
        for wallpaper in wallpapers {
            insert.execute(rusqlite::params![
                wallpaper.id,
                wallpaper.title,
                wallpaper.description,
                wallpaper.category,
                serde_json::to_string(&wallpaper.tags)?,
                wallpaper.image_url,
                i64::try_from(wallpaper.downloads)?,
                i64::try_from(wallpaper.likes)?,
                i64::try_from(wallpaper.views)?,
                wallpaper.premium,
                wallpaper.is_exclusive,
                wallpaper.created_at.map(|at| at.timestamp_millis()),
                wallpaper.updated_at.map(|at| at.timestamp_millis()),
            ])?;
        }
    }
    transaction.commit()?;
    Ok(())
}
