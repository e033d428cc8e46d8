//! Error types emitted by the Wallery CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.
//! Large library errors are boxed.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wallery_core::SqliteWallpaperStoreError;
use wallery_data::{CatalogWriteError, ExportError, PersistCatalogError};

/// Errors emitted by the Wallery CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing argument.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path} does not exist")]
    MissingSourceFile {
        /// Argument naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path} exists but is not a file")]
    SourcePathNotFile {
        /// Argument naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path}: {source}")]
    InspectSourcePath {
        /// Argument naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading the document export failed.
    #[error("failed to import export: {0}")]
    Import(#[from] ExportError),
    /// Persisting the imported catalog failed.
    #[error("failed to persist catalog to {path}: {source}")]
    PersistCatalog {
        /// Destination database.
        path: Utf8PathBuf,
        /// Underlying persistence error.
        #[source]
        source: Box<PersistCatalogError>,
    },
    /// Reading the catalog database failed.
    #[error("failed to read catalog: {source}")]
    Store {
        /// Underlying store error.
        #[source]
        source: Box<SqliteWallpaperStoreError>,
    },
    /// Writing to the catalog database failed.
    #[error("failed to update catalog: {source}")]
    CatalogWrite {
        /// Underlying writer error.
        #[source]
        source: Box<CatalogWriteError>,
    },
    /// The requested wallpaper does not exist.
    #[error("wallpaper {id} not found")]
    UnknownWallpaper {
        /// Requested identifier.
        id: String,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<SqliteWallpaperStoreError> for CliError {
    fn from(source: SqliteWallpaperStoreError) -> Self {
        Self::Store {
            source: Box::new(source),
        }
    }
}

impl From<CatalogWriteError> for CliError {
    fn from(source: CatalogWriteError) -> Self {
        Self::CatalogWrite {
            source: Box::new(source),
        }
    }
}
