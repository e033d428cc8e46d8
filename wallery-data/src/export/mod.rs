//! Import of document-database JSON exports.
//!
//! An export is a JSON object mapping collection names to objects that map
//! document ids to document bodies. The whole map may be wrapped in a
//! `__collections__` key, and each document may carry its own nested
//! `__collections__` entry, which is ignored here.
//!
//! ```json
//! {
//!   "__collections__": {
//!     "wallpapers": { "w1": { "title": "Aurora", "tags": ["sky"] } },
//!     "categories": { "Nature": { "wallpaperCount": 1 } }
//!   }
//! }
//! ```
#![forbid(unsafe_code)]

use std::io::{BufReader, Read};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use wallery_core::{Category, Collection, DecodeError, Document, Wallpaper};
use wallery_fs::open_utf8_file;

/// Key wrapping nested collections in an export.
pub const COLLECTIONS_KEY: &str = "__collections__";
/// Collection holding wallpaper documents.
pub const WALLPAPERS_COLLECTION: &str = "wallpapers";
/// Collection holding category documents.
pub const CATEGORIES_COLLECTION: &str = "categories";
/// Collection holding curated collection documents.
pub const COLLECTIONS_COLLECTION: &str = "collections";

/// Errors raised while reading an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export file could not be opened.
    #[error("failed to open export at {path}")]
    Open {
        /// Location of the export.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The export was not valid JSON.
    #[error("failed to parse export JSON")]
    Parse {
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The export root, or one of its collections, was not a JSON object.
    #[error("expected {what} to be a JSON object")]
    NotAnObject {
        /// Description of the offending value.
        what: String,
    },
}

/// Entities decoded from an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedCatalog {
    /// Decoded wallpapers, ordered by document id.
    pub wallpapers: Vec<Wallpaper>,
    /// Decoded categories, ordered by document id.
    pub categories: Vec<Category>,
    /// Decoded collections, ordered by document id.
    pub collections: Vec<Collection>,
    /// Documents that failed to decode and were left out.
    pub skipped: usize,
}

/// Entity counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Number of wallpapers imported.
    pub wallpapers: usize,
    /// Number of categories imported.
    pub categories: usize,
    /// Number of collections imported.
    pub collections: usize,
    /// Number of documents skipped.
    pub skipped: usize,
}

impl ImportedCatalog {
    /// Entity counts for reporting.
    #[must_use]
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            wallpapers: self.wallpapers.len(),
            categories: self.categories.len(),
            collections: self.collections.len(),
            skipped: self.skipped,
        }
    }
}

/// Decode an export from any reader.
///
/// Documents that cannot be decoded are logged, counted in
/// [`ImportedCatalog::skipped`] and otherwise ignored. Unknown collections
/// are ignored.
///
/// # Errors
///
/// Returns [`ExportError::Parse`] for malformed JSON and
/// [`ExportError::NotAnObject`] when the root or a known collection is not an
/// object.
///
/// # Examples
///
/// ```
/// use wallery_data::import_export;
///
/// let export = br#"{"wallpapers": {"w1": {"tags": ["sky", 7]}, "w2": []}}"#;
/// let catalog = import_export(&export[..])?;
/// assert_eq!(catalog.wallpapers.len(), 1);
/// assert_eq!(catalog.wallpapers[0].tags, vec!["sky"]);
/// assert_eq!(catalog.skipped, 1);
/// # Ok::<(), wallery_data::ExportError>(())
/// ```
pub fn import_export<R: Read>(reader: R) -> Result<ImportedCatalog, ExportError> {
    let root: Value = serde_json::from_reader(BufReader::new(reader))
        .map_err(|source| ExportError::Parse { source })?;
    let collections = unwrap_collections(root)?;

    let mut catalog = ImportedCatalog::default();
    for (name, documents) in collections {
        match name.as_str() {
            WALLPAPERS_COLLECTION => {
                catalog.wallpapers = decode_collection(
                    &name,
                    documents,
                    Wallpaper::from_document,
                    &mut catalog.skipped,
                )?;
            }
            CATEGORIES_COLLECTION => {
                catalog.categories = decode_collection(
                    &name,
                    documents,
                    Category::from_document,
                    &mut catalog.skipped,
                )?;
            }
            COLLECTIONS_COLLECTION => {
                catalog.collections = decode_collection(
                    &name,
                    documents,
                    Collection::from_document,
                    &mut catalog.skipped,
                )?;
            }
            other => debug!("ignoring export collection {other}"),
        }
    }

    info!(
        "decoded {} wallpapers, {} categories and {} collections ({} skipped)",
        catalog.wallpapers.len(),
        catalog.categories.len(),
        catalog.collections.len(),
        catalog.skipped
    );
    Ok(catalog)
}

/// Decode an export file.
///
/// # Errors
///
/// Returns [`ExportError::Open`] when the file cannot be opened, otherwise as
/// [`import_export`].
pub fn import_export_file(path: &Utf8Path) -> Result<ImportedCatalog, ExportError> {
    let file = open_utf8_file(path).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    import_export(file)
}

fn unwrap_collections(root: Value) -> Result<Map<String, Value>, ExportError> {
    let Value::Object(mut map) = root else {
        return Err(ExportError::NotAnObject {
            what: "export root".to_owned(),
        });
    };
    match map.remove(COLLECTIONS_KEY) {
        Some(Value::Object(inner)) => Ok(inner),
        Some(_) => Err(ExportError::NotAnObject {
            what: COLLECTIONS_KEY.to_owned(),
        }),
        None => Ok(map),
    }
}

fn decode_collection<T>(
    name: &str,
    documents: Value,
    decode: fn(&Document) -> Result<T, DecodeError>,
    skipped: &mut usize,
) -> Result<Vec<T>, ExportError> {
    let Value::Object(documents) = documents else {
        return Err(ExportError::NotAnObject {
            what: format!("collection `{name}`"),
        });
    };

    let mut ordered: Vec<(String, Value)> = documents.into_iter().collect();
    ordered.sort_by(|(left, _), (right, _)| left.cmp(right));

    let mut decoded = Vec::with_capacity(ordered.len());
    for (id, body) in ordered {
        match Document::from_value(id, body).and_then(|mut document| {
            document.fields.remove(COLLECTIONS_KEY);
            decode(&document)
        }) {
            Ok(entity) => decoded.push(entity),
            Err(err) => {
                warn!("skipping document in {name}: {err}");
                *skipped += 1;
            }
        }
    }
    Ok(decoded)
}
