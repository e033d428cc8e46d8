//! Bulk persistence of an imported catalog to SQLite.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use rusqlite::{Connection, Error as SqliteError, Transaction, params};
use serde_json::to_string;
use thiserror::Error;
use wallery_core::{CATALOG_SCHEMA, Category, Collection, Wallpaper};
use wallery_fs::ensure_parent_dir;

use crate::ImportedCatalog;

/// Errors raised when persisting an imported catalog to SQLite.
#[derive(Debug, Error)]
pub enum PersistCatalogError {
    /// Failed to create the parent directory for the SQLite artefact.
    #[error("failed to create parent directory for {path}")]
    CreateDirectory {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the catalog tables failed.
    #[error("failed to create catalog schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin catalog persistence transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing an insert statement failed.
    #[error("failed to prepare insert into {table}")]
    Prepare {
        /// Table targeted by the statement.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A counter could not be represented as an SQLite integer.
    #[error("counter on {table} row {id} exceeds SQLite i64 range")]
    CounterOutOfRange {
        /// Table holding the row.
        table: &'static str,
        /// Identifier of the row.
        id: String,
    },
    /// Serializing a JSON column failed.
    #[error("failed to serialize {table} row {id}")]
    SerializeJson {
        /// Table holding the row.
        table: &'static str,
        /// Identifier of the row.
        id: String,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Writing a row failed.
    #[error("failed to persist {table} row {id}")]
    PersistRow {
        /// Table holding the row.
        table: &'static str,
        /// Identifier of the row.
        id: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit catalog persistence transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Persist an imported catalog to a SQLite database on disk.
///
/// Rows are replaced when their identifiers already exist, so importing the
/// same export twice leaves the database unchanged. Parent directories are
/// created automatically and missing tables are initialised.
///
/// # Errors
///
/// Each failing step maps to its own [`PersistCatalogError`] variant; nothing
/// is committed when any row fails.
pub fn persist_catalog_to_sqlite(
    path: &Utf8Path,
    catalog: &ImportedCatalog,
) -> Result<(), PersistCatalogError> {
    ensure_parent_dir(path).map_err(|source| PersistCatalogError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| PersistCatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    connection
        .execute_batch(CATALOG_SCHEMA)
        .map_err(|source| PersistCatalogError::CreateSchema { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| PersistCatalogError::BeginTransaction { source })?;

    persist_wallpapers(&transaction, &catalog.wallpapers)?;
    persist_categories(&transaction, &catalog.categories)?;
    persist_collections(&transaction, &catalog.collections)?;

    transaction
        .commit()
        .map_err(|source| PersistCatalogError::Commit { source })?;
    info!(
        "persisted {} wallpapers, {} categories and {} collections to {path}",
        catalog.wallpapers.len(),
        catalog.categories.len(),
        catalog.collections.len()
    );
    Ok(())
}

fn counter(table: &'static str, id: &str, value: u64) -> Result<i64, PersistCatalogError> {
    i64::try_from(value).map_err(|_| PersistCatalogError::CounterOutOfRange {
        table,
        id: id.to_owned(),
    })
}

fn persist_wallpapers(
    transaction: &Transaction<'_>,
    wallpapers: &[Wallpaper],
) -> Result<(), PersistCatalogError> {
    const TABLE: &str = "wallpapers";
    if wallpapers.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare(
            "INSERT OR REPLACE INTO wallpapers (id, title, description, category, tags, \
             image_url, downloads, likes, views, premium, is_exclusive, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .map_err(|source| PersistCatalogError::Prepare {
            table: TABLE,
            source,
        })?;

    for wallpaper in wallpapers {
        let id = wallpaper.id.as_str();
        let tags = to_string(&wallpaper.tags).map_err(|source| {
            PersistCatalogError::SerializeJson {
                table: TABLE,
                id: id.to_owned(),
                source,
            }
        })?;
        statement
            .execute(params![
                id,
                wallpaper.title,
                wallpaper.description,
                wallpaper.category,
                tags,
                wallpaper.image_url,
                counter(TABLE, id, wallpaper.downloads)?,
                counter(TABLE, id, wallpaper.likes)?,
                counter(TABLE, id, wallpaper.views)?,
                wallpaper.premium,
                wallpaper.is_exclusive,
                wallpaper.created_at.map(|at| at.timestamp_millis()),
                wallpaper.updated_at.map(|at| at.timestamp_millis()),
            ])
            .map_err(|source| PersistCatalogError::PersistRow {
                table: TABLE,
                id: id.to_owned(),
                source,
            })?;
    }
    Ok(())
}

fn persist_categories(
    transaction: &Transaction<'_>,
    categories: &[Category],
) -> Result<(), PersistCatalogError> {
    const TABLE: &str = "categories";
    if categories.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare("INSERT OR REPLACE INTO categories (name, wallpaper_count) VALUES (?1, ?2)")
        .map_err(|source| PersistCatalogError::Prepare {
            table: TABLE,
            source,
        })?;

    for category in categories {
        let name = category.name.as_str();
        statement
            .execute(params![name, counter(TABLE, name, category.wallpaper_count)?])
            .map_err(|source| PersistCatalogError::PersistRow {
                table: TABLE,
                id: name.to_owned(),
                source,
            })?;
    }
    Ok(())
}

fn persist_collections(
    transaction: &Transaction<'_>,
    collections: &[Collection],
) -> Result<(), PersistCatalogError> {
    const TABLE: &str = "collections";
    if collections.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare(
            "INSERT OR REPLACE INTO collections \
             (id, title, description, wallpaper_ids, views, downloads) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(|source| PersistCatalogError::Prepare {
            table: TABLE,
            source,
        })?;

    for collection in collections {
        let id = collection.id.as_str();
        let members = to_string(&collection.wallpaper_ids).map_err(|source| {
            PersistCatalogError::SerializeJson {
                table: TABLE,
                id: id.to_owned(),
                source,
            }
        })?;
        statement
            .execute(params![
                id,
                collection.title,
                collection.description,
                members,
                counter(TABLE, id, collection.views)?,
                counter(TABLE, id, collection.downloads)?,
            ])
            .map_err(|source| PersistCatalogError::PersistRow {
                table: TABLE,
                id: id.to_owned(),
                source,
            })?;
    }
    Ok(())
}
