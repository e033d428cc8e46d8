//! Transactional catalog mutations.
//!
//! Every write that touches a derived counter (a category's wallpaper count,
//! a wallpaper's engagement totals) adjusts it inside the same SQLite
//! transaction as the row it derives from, so the two never diverge on a
//! partial failure. [`CatalogWriter::reconcile_category_counts`] remains
//! available to repair counts written by other tools.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction, params};
use thiserror::Error;
use wallery_core::{CATALOG_SCHEMA, Category, Wallpaper};
use wallery_fs::ensure_parent_dir;

use crate::objects::{ObjectStore, ObjectStoreError};

mod publish;


/// Errors raised by [`CatalogWriter`].
#[derive(Debug, Error)]
pub enum CatalogWriteError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path}")]
    CreateDirectory {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A statement failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// Short description of the failing step.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The wallpaper has a blank identifier.
    #[error("wallpaper id must not be blank")]
    MissingId,
    /// A wallpaper with this id already exists.
    #[error("wallpaper {id} already exists")]
    AlreadyExists {
        /// Conflicting identifier.
        id: String,
    },
    /// No wallpaper has this id.
    #[error("wallpaper {id} not found")]
    NotFound {
        /// Requested identifier.
        id: String,
    },
    /// A counter could not be represented as an SQLite integer.
    #[error("counter on wallpaper {id} exceeds SQLite i64 range")]
    CounterOutOfRange {
        /// Identifier of the wallpaper.
        id: String,
    },
    /// Serializing a JSON column or payload failed.
    #[error("failed to serialize wallpaper {id}")]
    SerializeJson {
        /// Identifier of the wallpaper.
        id: String,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The row was deleted but its image object could not be removed.
    #[error("deleted wallpaper {id} but failed to remove its image")]
    RemoveObject {
        /// Identifier of the deleted wallpaper.
        id: String,
        /// Source error produced by the object store.
        #[source]
        source: ObjectStoreError,
    },
}

impl CatalogWriteError {
    const fn sqlite(operation: &'static str, source: SqliteError) -> Self {
        Self::Sqlite { operation, source }
    }
}

/// Engagement counters backed by an event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engagement {
    Download,
    View,
}

impl Engagement {
    const fn table(self) -> &'static str {
        match self {
            Self::Download => "downloads",
            Self::View => "views",
        }
    }
}

/// Read-write handle on a catalog database.
///
/// # Examples
///
/// ```
/// use wallery_core::Wallpaper;
/// use wallery_data::CatalogWriter;
///
/// let mut writer = CatalogWriter::open_in_memory()?;
/// writer.create_wallpaper(&Wallpaper::new("w1").with_category("Nature"))?;
/// assert_eq!(writer.record_download("w1", None)?, 1);
/// assert_eq!(writer.categories()?[0].wallpaper_count, 1);
/// # Ok::<(), wallery_data::CatalogWriteError>(())
/// ```
#[derive(Debug)]
pub struct CatalogWriter {
    connection: Connection,
}

impl CatalogWriter {
    /// Open, or create, the catalog database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created, the database
    /// cannot be opened or the schema cannot be applied.
    pub fn open(path: &Utf8Path) -> Result<Self, CatalogWriteError> {
        ensure_parent_dir(path).map_err(|source| CatalogWriteError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| CatalogWriteError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, CatalogWriteError> {
        let connection =
            Connection::open_in_memory().map_err(|source| CatalogWriteError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, CatalogWriteError> {
        connection
            .execute_batch(CATALOG_SCHEMA)
            .map_err(|source| CatalogWriteError::sqlite("create catalog schema", source))?;
        Ok(Self { connection })
    }

    fn begin(&mut self) -> Result<Transaction<'_>, CatalogWriteError> {
        self.connection
            .transaction()
            .map_err(|source| CatalogWriteError::sqlite("begin transaction", source))
    }

    /// Insert a new wallpaper and count it against its category.
    ///
    /// Missing timestamps default to now. The category row is created when
    /// absent; a blank category is not counted.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::MissingId`] for a blank id and
    /// [`CatalogWriteError::AlreadyExists`] when the id is taken.
    pub fn create_wallpaper(&mut self, wallpaper: &Wallpaper) -> Result<(), CatalogWriteError> {
        let transaction = self.begin()?;
        insert_wallpaper(&transaction, wallpaper, Utc::now())?;
        commit(transaction)?;
        info!("created wallpaper {}", wallpaper.id);
        Ok(())
    }

    /// Replace the editable fields of an existing wallpaper.
    ///
    /// Engagement counters and `created_at` are left untouched and
    /// `updated_at` is set to now. When the category changes, one unit of
    /// count moves from the old category to the new one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::NotFound`] when no wallpaper has the id.
    pub fn update_wallpaper(&mut self, wallpaper: &Wallpaper) -> Result<(), CatalogWriteError> {
        let id = wallpaper.id.as_str();
        let tags = tags_json(wallpaper)?;
        let transaction = self.begin()?;
        let (previous_category, _) = stored_category_and_image(&transaction, id)?;

        transaction
            .execute(
                "UPDATE wallpapers SET title = ?2, description = ?3, category = ?4, tags = ?5, \
                 image_url = ?6, premium = ?7, is_exclusive = ?8, updated_at = ?9 \
                 WHERE id = ?1",
                params![
                    id,
                    wallpaper.title,
                    wallpaper.description,
                    wallpaper.category,
                    tags,
                    wallpaper.image_url,
                    wallpaper.premium,
                    wallpaper.is_exclusive,
                    Utc::now().timestamp_millis(),
                ],
            )
            .map_err(|source| CatalogWriteError::sqlite("update wallpaper", source))?;

        if previous_category != wallpaper.category {
            decrement_category(&transaction, &previous_category)?;
            increment_category(&transaction, &wallpaper.category)?;
            debug!(
                "moved wallpaper {id} from {previous_category:?} to {:?}",
                wallpaper.category
            );
        }
        commit(transaction)
    }

    /// Delete a wallpaper, its likes and its image object.
    ///
    /// The database changes commit before the object is removed, so a
    /// failing object store leaves an orphaned file rather than a dangling
    /// row.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::NotFound`] when no wallpaper has the id
    /// and [`CatalogWriteError::RemoveObject`] when the image removal fails.
    pub fn delete_wallpaper(
        &mut self,
        id: &str,
        objects: &dyn ObjectStore,
    ) -> Result<(), CatalogWriteError> {
        let transaction = self.begin()?;
        let (category, image_url) = stored_category_and_image(&transaction, id)?;
        transaction
            .execute("DELETE FROM wallpapers WHERE id = ?1", [id])
            .map_err(|source| CatalogWriteError::sqlite("delete wallpaper", source))?;
        transaction
            .execute("DELETE FROM likes WHERE wallpaper_id = ?1", [id])
            .map_err(|source| CatalogWriteError::sqlite("delete wallpaper likes", source))?;
        decrement_category(&transaction, &category)?;
        commit(transaction)?;
        info!("deleted wallpaper {id}");

        if image_url.is_empty() {
            return Ok(());
        }
        objects
            .remove(&image_url)
            .map(|_| ())
            .map_err(|source| CatalogWriteError::RemoveObject {
                id: id.to_owned(),
                source,
            })
    }

    /// Record a download event and return the new download total.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::NotFound`] when no wallpaper has the id.
    pub fn record_download(
        &mut self,
        id: &str,
        user_id: Option<&str>,
    ) -> Result<u64, CatalogWriteError> {
        self.record_engagement(Engagement::Download, id, user_id)
    }

    /// Record a view event and return the new view total.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::NotFound`] when no wallpaper has the id.
    pub fn record_view(
        &mut self,
        id: &str,
        user_id: Option<&str>,
    ) -> Result<u64, CatalogWriteError> {
        self.record_engagement(Engagement::View, id, user_id)
    }

    fn record_engagement(
        &mut self,
        engagement: Engagement,
        id: &str,
        user_id: Option<&str>,
    ) -> Result<u64, CatalogWriteError> {
        let table = engagement.table();
        let transaction = self.begin()?;
        let updated = transaction
            .execute(
                &format!("UPDATE wallpapers SET {table} = {table} + 1 WHERE id = ?1"),
                [id],
            )
            .map_err(|source| CatalogWriteError::sqlite("increment engagement counter", source))?;
        if updated == 0 {
            return Err(CatalogWriteError::NotFound { id: id.to_owned() });
        }
        transaction
            .execute(
                &format!(
                    "INSERT INTO {table} (wallpaper_id, user_id, created_at) VALUES (?1, ?2, ?3)"
                ),
                params![id, user_id, Utc::now().timestamp_millis()],
            )
            .map_err(|source| CatalogWriteError::sqlite("append engagement event", source))?;
        let total: i64 = transaction
            .query_row(
                &format!("SELECT {table} FROM wallpapers WHERE id = ?1"),
                [id],
                |row| row.get(0),
            )
            .map_err(|source| CatalogWriteError::sqlite("read engagement counter", source))?;
        commit(transaction)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    /// Like a wallpaper on behalf of `user_id`.
    ///
    /// Returns `false` without changing anything when the user already likes
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::NotFound`] when no wallpaper has the id.
    pub fn like(&mut self, id: &str, user_id: &str) -> Result<bool, CatalogWriteError> {
        let transaction = self.begin()?;
        stored_category_and_image(&transaction, id)?;
        let inserted = transaction
            .execute(
                "INSERT OR IGNORE INTO likes (user_id, wallpaper_id, created_at) \
                 VALUES (?1, ?2, ?3)",
                params![user_id, id, Utc::now().timestamp_millis()],
            )
            .map_err(|source| CatalogWriteError::sqlite("insert like", source))?;
        if inserted == 0 {
            debug!("{user_id} already likes {id}");
            return Ok(false);
        }
        transaction
            .execute("UPDATE wallpapers SET likes = likes + 1 WHERE id = ?1", [id])
            .map_err(|source| CatalogWriteError::sqlite("increment likes", source))?;
        commit(transaction)?;
        Ok(true)
    }

    /// Withdraw a like by `user_id`.
    ///
    /// Returns `false` when there was no like to withdraw. The stored total
    /// never drops below zero.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::Sqlite`] when a statement fails.
    pub fn unlike(&mut self, id: &str, user_id: &str) -> Result<bool, CatalogWriteError> {
        let transaction = self.begin()?;
        let removed = transaction
            .execute(
                "DELETE FROM likes WHERE user_id = ?1 AND wallpaper_id = ?2",
                [user_id, id],
            )
            .map_err(|source| CatalogWriteError::sqlite("delete like", source))?;
        if removed == 0 {
            return Ok(false);
        }
        transaction
            .execute(
                "UPDATE wallpapers SET likes = MAX(likes - 1, 0) WHERE id = ?1",
                [id],
            )
            .map_err(|source| CatalogWriteError::sqlite("decrement likes", source))?;
        commit(transaction)?;
        Ok(true)
    }

    /// Recompute every category's count from the wallpapers table.
    ///
    /// Categories referenced by wallpapers but missing a row are created.
    /// Returns the categories after the repair.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::Sqlite`] when a statement fails.
    pub fn reconcile_category_counts(&mut self) -> Result<Vec<Category>, CatalogWriteError> {
        let transaction = self.begin()?;
        transaction
            .execute(
                "INSERT OR IGNORE INTO categories (name, wallpaper_count) \
                 SELECT DISTINCT category, 0 FROM wallpapers WHERE category != ''",
                [],
            )
            .map_err(|source| CatalogWriteError::sqlite("create missing categories", source))?;
        let repaired = transaction
            .execute(
                "UPDATE categories SET wallpaper_count = \
                 (SELECT COUNT(*) FROM wallpapers WHERE wallpapers.category = categories.name)",
                [],
            )
            .map_err(|source| CatalogWriteError::sqlite("recount categories", source))?;
        commit(transaction)?;
        info!("reconciled {repaired} category counts");
        self.categories()
    }

    /// Every category ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::Sqlite`] when the query fails.
    pub fn categories(&self) -> Result<Vec<Category>, CatalogWriteError> {
        let query_error = |source| CatalogWriteError::sqlite("list categories", source);
        let mut statement = self
            .connection
            .prepare("SELECT name, wallpaper_count FROM categories ORDER BY name")
            .map_err(query_error)?;
        statement
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok(Category::new(row.get::<_, String>(0)?)
                    .with_count(u64::try_from(count).unwrap_or_default()))
            })
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)
    }
}

fn commit(transaction: Transaction<'_>) -> Result<(), CatalogWriteError> {
    transaction
        .commit()
        .map_err(|source| CatalogWriteError::sqlite("commit transaction", source))
}

fn tags_json(wallpaper: &Wallpaper) -> Result<String, CatalogWriteError> {
    serde_json::to_string(&wallpaper.tags).map_err(|source| CatalogWriteError::SerializeJson {
        id: wallpaper.id.clone(),
        source,
    })
}

fn counter(id: &str, value: u64) -> Result<i64, CatalogWriteError> {
    i64::try_from(value).map_err(|_| CatalogWriteError::CounterOutOfRange { id: id.to_owned() })
}

fn wallpaper_exists(transaction: &Transaction<'_>, id: &str) -> Result<bool, CatalogWriteError> {
    transaction
        .query_row("SELECT 1 FROM wallpapers WHERE id = ?1", [id], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
        .map_err(|source| CatalogWriteError::sqlite("look up wallpaper", source))
}

fn stored_category_and_image(
    transaction: &Transaction<'_>,
    id: &str,
) -> Result<(String, String), CatalogWriteError> {
    transaction
        .query_row(
            "SELECT category, image_url FROM wallpapers WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|source| CatalogWriteError::sqlite("look up wallpaper", source))?
        .ok_or_else(|| CatalogWriteError::NotFound { id: id.to_owned() })
}

/// Insert `wallpaper` and count it against its category.
///
/// Missing timestamps default to `now`.
fn insert_wallpaper(
    transaction: &Transaction<'_>,
    wallpaper: &Wallpaper,
    now: DateTime<Utc>,
) -> Result<(), CatalogWriteError> {
    let id = wallpaper.id.as_str();
    if id.trim().is_empty() {
        return Err(CatalogWriteError::MissingId);
    }
    if wallpaper_exists(transaction, id)? {
        return Err(CatalogWriteError::AlreadyExists { id: id.to_owned() });
    }

    let created_at = wallpaper.created_at.unwrap_or(now);
    let updated_at = wallpaper.updated_at.unwrap_or(created_at);
    transaction
        .execute(
            "INSERT INTO wallpapers (id, title, description, category, tags, image_url, \
             downloads, likes, views, premium, is_exclusive, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                id,
                wallpaper.title,
                wallpaper.description,
                wallpaper.category,
                tags_json(wallpaper)?,
                wallpaper.image_url,
                counter(id, wallpaper.downloads)?,
                counter(id, wallpaper.likes)?,
                counter(id, wallpaper.views)?,
                wallpaper.premium,
                wallpaper.is_exclusive,
                created_at.timestamp_millis(),
                updated_at.timestamp_millis(),
            ],
        )
        .map_err(|source| CatalogWriteError::sqlite("insert wallpaper", source))?;
    increment_category(transaction, &wallpaper.category)
}

fn increment_category(transaction: &Transaction<'_>, name: &str) -> Result<(), CatalogWriteError> {
    if name.is_empty() {
        return Ok(());
    }
    transaction
        .execute(
            "INSERT INTO categories (name, wallpaper_count) VALUES (?1, 1) \
             ON CONFLICT(name) DO UPDATE SET wallpaper_count = wallpaper_count + 1",
            [name],
        )
        .map(|_| ())
        .map_err(|source| CatalogWriteError::sqlite("increment category count", source))
}

fn decrement_category(transaction: &Transaction<'_>, name: &str) -> Result<(), CatalogWriteError> {
    if name.is_empty() {
        return Ok(());
    }
    transaction
        .execute(
            "UPDATE categories SET wallpaper_count = MAX(wallpaper_count - 1, 0) WHERE name = ?1",
            [name],
        )
        .map(|_| ())
        .map_err(|source| CatalogWriteError::sqlite("decrement category count", source))
}
