//! Data access and mutation for the Wallery catalog.
//!
//! Responsibilities:
//! - Decode document-database exports into catalog entities.
//! - Persist catalogs to SQLite and apply transactional mutations that keep
//!   derived counters next to the rows they derive from.
//! - Publish scheduled drafts and manage the local upload staging queue.
//! - Remove image objects through the [`ObjectStore`] seam.
//!
//! Boundaries:
//! - Ranking and recommendation rules live in `wallery-scorer`.
//! - Read-only snapshot access lives in `wallery-core`.
//!
//! Invariants:
//! - Every counter adjustment commits with the row it belongs to.
//! - No global mutable state.

#![forbid(unsafe_code)]

mod catalog;
mod export;
mod objects;
mod persist;
mod staging;

pub use catalog::{CatalogWriteError, CatalogWriter};
pub use export::{
    CATEGORIES_COLLECTION, COLLECTIONS_COLLECTION, COLLECTIONS_KEY, ExportError, ImportSummary,
    ImportedCatalog, WALLPAPERS_COLLECTION, import_export, import_export_file,
};
pub use objects::{LocalObjectStore, ObjectStore, ObjectStoreError};
pub use persist::{PersistCatalogError, persist_catalog_to_sqlite};
pub use staging::{StagedUpload, StagingError, StagingQueue, UploadStatus};
