//! Backing storage for wallpaper image objects.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;
use wallery_fs::remove_file_if_present;

/// Errors raised by an [`ObjectStore`].
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// The URL does not name an object inside the store.
    #[error("object url {url:?} does not resolve inside the media root")]
    InvalidUrl {
        /// Offending URL.
        url: String,
    },
    /// Removing the backing file failed.
    #[error("failed to remove object at {path}")]
    Remove {
        /// Resolved file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Removes stored image objects by URL.
///
/// Implementations must treat an object that is already gone as removed.
pub trait ObjectStore: Send + Sync {
    /// Remove the object behind `url`.
    ///
    /// Returns `true` when something was deleted and `false` when the object
    /// did not exist.
    ///
    /// # Errors
    ///
    /// Returns an [`ObjectStoreError`] when the URL is unusable or the
    /// backend refuses the removal.
    fn remove(&self, url: &str) -> Result<bool, ObjectStoreError>;
}

/// Object store backed by files under a local media root.
///
/// Object URLs map to paths relative to the root: any `scheme://host` prefix
/// and query string are dropped, so `https://cdn.example/wallpapers/a.jpg`
/// and `/wallpapers/a.jpg` both resolve to `<root>/wallpapers/a.jpg`.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use wallery_data::LocalObjectStore;
///
/// let store = LocalObjectStore::new("/srv/media");
/// assert_eq!(
///     store.resolve("https://cdn.example/w/a.jpg?v=2").ok(),
///     Some(Utf8PathBuf::from("/srv/media/w/a.jpg"))
/// );
/// assert!(store.resolve("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: Utf8PathBuf,
}

impl LocalObjectStore {
    /// Serve objects from files under `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Media root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Map an object URL to its file under the media root.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::InvalidUrl`] when the URL names no file or
    /// would escape the root.
    pub fn resolve(&self, url: &str) -> Result<Utf8PathBuf, ObjectStoreError> {
        let invalid = || ObjectStoreError::InvalidUrl {
            url: url.to_owned(),
        };
        let without_scheme = match url.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
            None => url,
        };
        let path = without_scheme
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');

        let relative = Utf8Path::new(path);
        let mut resolved = self.root.clone();
        let mut pushed = false;
        for component in relative.components() {
            match component {
                Utf8Component::Normal(part) => {
                    resolved.push(part);
                    pushed = true;
                }
                Utf8Component::CurDir => {}
                Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                    return Err(invalid());
                }
            }
        }
        if pushed { Ok(resolved) } else { Err(invalid()) }
    }
}

impl ObjectStore for LocalObjectStore {
    fn remove(&self, url: &str) -> Result<bool, ObjectStoreError> {
        let path = self.resolve(url)?;
        let removed =
            remove_file_if_present(&path).map_err(|source| ObjectStoreError::Remove {
                path: path.clone(),
                source,
            })?;
        if !removed {
            debug!("object {path} was already absent");
        }
        Ok(removed)
    }
}
