//! SQLite-backed read store for persisted wallpapers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use thiserror::Error;

use crate::{PopularityWeights, Wallpaper};

use super::WallpaperStore;

const WALLPAPER_COLUMNS: &str = "id, title, description, category, tags, image_url, \
     downloads, likes, views, premium, is_exclusive, created_at, updated_at";

const NEWEST_FIRST: &str = "created_at DESC NULLS LAST, id ASC";

/// Error raised when reading persisted wallpapers.
#[derive(Debug, Error)]
pub enum SqliteWallpaperStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A query against the catalog failed.
    #[error("failed to {operation}: {source}")]
    Query {
        /// Short description of the failed read.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The stored tag payload was not a JSON array of strings.
    #[error("failed to parse tags for wallpaper {id}: {source}")]
    InvalidTags {
        /// Identifier of the wallpaper whose tags failed to parse.
        id: String,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only wallpaper store backed by a SQLite catalog.
///
/// The database is opened read-only; writes go through the data pipeline.
pub struct SqliteWallpaperStore {
    connection: Mutex<Connection>,
    path: PathBuf,
}

impl fmt::Debug for SqliteWallpaperStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteWallpaperStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteWallpaperStore {
    /// Open the catalog at `path` and check that the `wallpapers` table is readable.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteWallpaperStoreError::OpenDatabase`] when the file is
    /// missing, unreadable or lacks the catalog schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteWallpaperStoreError> {
        let path = path.as_ref().to_path_buf();
        let connection = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .and_then(|connection| {
                connection.query_row("SELECT COUNT(*) FROM wallpapers", [], |row| {
                    row.get::<_, i64>(0)
                })?;
                Ok(connection)
            })
            .map_err(|source| SqliteWallpaperStoreError::OpenDatabase {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            connection: Mutex::new(connection),
            path,
        })
    }

    /// Location of the backing database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn query_wallpapers<P: rusqlite::Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> Result<Vec<Wallpaper>, SqliteWallpaperStoreError> {
        let query_error = |source| SqliteWallpaperStoreError::Query { operation, source };
        let connection = self.lock();
        let mut statement = connection.prepare(sql).map_err(query_error)?;
        let rows = statement
            .query_map(params, WallpaperRow::from_row)
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;
        rows.into_iter().map(WallpaperRow::into_wallpaper).collect()
    }
}

impl WallpaperStore for SqliteWallpaperStore {
    type Error = SqliteWallpaperStoreError;

    fn all_wallpapers(&self) -> Result<Vec<Wallpaper>, Self::Error> {
        let sql = format!("SELECT {WALLPAPER_COLUMNS} FROM wallpapers ORDER BY {NEWEST_FIRST}");
        self.query_wallpapers("list wallpapers", &sql, [])
    }

    fn popular_wallpapers(&self, count: usize) -> Result<Vec<Wallpaper>, Self::Error> {
        let weights = PopularityWeights::default();
        let sql = format!(
            "SELECT {WALLPAPER_COLUMNS} FROM wallpapers \
             ORDER BY downloads * ?1 + likes * ?2 + views * ?3 DESC, {NEWEST_FIRST} \
             LIMIT ?4"
        );
        self.query_wallpapers(
            "list popular wallpapers",
            &sql,
            params![
                to_sql_int(weights.downloads),
                to_sql_int(weights.likes),
                to_sql_int(weights.views),
                i64::try_from(count).unwrap_or(i64::MAX),
            ],
        )
    }

    fn wallpaper(&self, id: &str) -> Result<Option<Wallpaper>, Self::Error> {
        let query_error = |source| SqliteWallpaperStoreError::Query {
            operation: "look up wallpaper",
            source,
        };
        let sql = format!("SELECT {WALLPAPER_COLUMNS} FROM wallpapers WHERE id = ?1");
        let row = self
            .lock()
            .query_row(&sql, [id], WallpaperRow::from_row)
            .optional()
            .map_err(query_error)?;
        row.map(WallpaperRow::into_wallpaper).transpose()
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_counter(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

fn from_sql_millis(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(DateTime::from_timestamp_millis)
}

/// Column values as stored, before tag decoding.
struct WallpaperRow {
    id: String,
    title: String,
    description: String,
    category: String,
    tags: String,
    image_url: String,
    downloads: i64,
    likes: i64,
    views: i64,
    premium: bool,
    is_exclusive: bool,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl WallpaperRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            tags: row.get(4)?,
            image_url: row.get(5)?,
            downloads: row.get(6)?,
            likes: row.get(7)?,
            views: row.get(8)?,
            premium: row.get(9)?,
            is_exclusive: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn into_wallpaper(self) -> Result<Wallpaper, SqliteWallpaperStoreError> {
        let tags: Vec<String> = serde_json::from_str(&self.tags).map_err(|source| {
            SqliteWallpaperStoreError::InvalidTags {
                id: self.id.clone(),
                source,
            }
        })?;
        Ok(Wallpaper {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            tags,
            image_url: self.image_url,
            downloads: from_sql_counter(self.downloads),
            likes: from_sql_counter(self.likes),
            views: from_sql_counter(self.views),
            premium: self.premium,
            is_exclusive: self.is_exclusive,
            created_at: from_sql_millis(self.created_at),
            updated_at: from_sql_millis(self.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{wallpaper, write_sqlite_catalog};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_db() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("wallery.db");
        (dir, path)
    }

    fn ids(wallpapers: &[Wallpaper]) -> Vec<&str> {
        wallpapers.iter().map(|w| w.id.as_str()).collect()
    }

    #[rstest]
    fn round_trips_every_column(#[from(temp_db)] (_dir, path): (TempDir, PathBuf)) {
        let created = DateTime::from_timestamp_millis(1_700_000_000_123).expect("timestamp");
        let original = wallpaper("w1", "Nature", &["Sunset", "sky"])
            .with_title("Golden Sunset")
            .with_description("Warm light")
            .with_image_url("media/w1.jpg")
            .with_engagement(4, 3, 2)
            .with_premium(true)
            .with_exclusive(true)
            .with_created_at(created);
        write_sqlite_catalog(&path, std::slice::from_ref(&original)).expect("write catalog");

        let store = SqliteWallpaperStore::open(&path).expect("open store");
        assert_eq!(store.all_wallpapers().expect("list"), vec![original]);
    }

    #[rstest]
    fn lists_newest_first(#[from(temp_db)] (_dir, path): (TempDir, PathBuf)) {
        let older = DateTime::from_timestamp_millis(1_000).expect("timestamp");
        let newer = DateTime::from_timestamp_millis(2_000).expect("timestamp");
        write_sqlite_catalog(
            &path,
            &[
                wallpaper("undated", "Nature", &[]),
                wallpaper("older", "Nature", &[]).with_created_at(older),
                wallpaper("newer", "Nature", &[]).with_created_at(newer),
            ],
        )
        .expect("write catalog");

        let store = SqliteWallpaperStore::open(&path).expect("open store");
        let all = store.all_wallpapers().expect("list");
        assert_eq!(ids(&all), vec!["newer", "older", "undated"]);
    }

    #[rstest]
    fn popular_matches_in_memory_ranking(#[from(temp_db)] (_dir, path): (TempDir, PathBuf)) {
        let wallpapers = vec![
            wallpaper("a", "Nature", &[]).with_engagement(0, 0, 14),
            wallpaper("b", "Nature", &[]).with_engagement(0, 4, 0),
            wallpaper("c", "Nature", &[]).with_engagement(3, 0, 0),
            wallpaper("d", "Nature", &[]).with_engagement(0, 0, 1),
        ];
        write_sqlite_catalog(&path, &wallpapers).expect("write catalog");

        let store = SqliteWallpaperStore::open(&path).expect("open store");
        let popular = store.popular_wallpapers(3).expect("popular");
        assert_eq!(ids(&popular), vec!["c", "a", "b"]);
    }

    #[rstest]
    fn looks_up_single_wallpaper(#[from(temp_db)] (_dir, path): (TempDir, PathBuf)) {
        write_sqlite_catalog(&path, &[wallpaper("w1", "City", &["neon"])]).expect("write");
        let store = SqliteWallpaperStore::open(&path).expect("open store");
        assert_eq!(
            store.wallpaper("w1").expect("lookup").map(|w| w.category),
            Some("City".to_owned())
        );
        assert!(store.wallpaper("w2").expect("lookup").is_none());
    }

    #[rstest]
    fn missing_database_fails_to_open(#[from(temp_db)] (_dir, path): (TempDir, PathBuf)) {
        let error = SqliteWallpaperStore::open(&path).expect_err("missing file");
        assert!(matches!(error, SqliteWallpaperStoreError::OpenDatabase { .. }));
    }

    #[rstest]
    fn invalid_tags_are_reported(#[from(temp_db)] (_dir, path): (TempDir, PathBuf)) {
        write_sqlite_catalog(&path, &[]).expect("write schema");
        let connection = Connection::open(&path).expect("open for writing");
        connection
            .execute(
                "INSERT INTO wallpapers (id, tags) VALUES ('broken', 'not-json')",
                [],
            )
            .expect("insert row");
        drop(connection);

        let store = SqliteWallpaperStore::open(&path).expect("open store");
        let error = store.all_wallpapers().expect_err("invalid tags");
        assert!(matches!(
            error,
            SqliteWallpaperStoreError::InvalidTags { ref id, .. } if id == "broken"
        ));
    }
}
