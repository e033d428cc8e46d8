//! File-backed queue of uploads waiting to be pushed to the catalog.
//!
//! The queue is a JSON array persisted next to the uploader. Entries move
//! `Pending -> Uploading -> Uploaded` or into `Failed`, and a failed entry
//! may be retried by marking it uploading again. Loading a queue resets any
//! `Uploading` entry to `Pending`: an upload interrupted by a crash starts
//! over from the beginning rather than resuming.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wallery_fs::{file_is_file, read_utf8_to_string, write_atomically};

/// Progress of a staged upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UploadStatus {
    /// Waiting to be picked up.
    #[default]
    Pending,
    /// Currently being transferred.
    Uploading,
    /// Transferred and published.
    Uploaded,
    /// The last attempt failed.
    Failed,
}

/// A local file waiting to become a wallpaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedUpload {
    /// Identifier of the queue entry.
    pub id: String,
    /// Local file name of the image.
    pub file_name: String,
    /// Title to publish with.
    #[serde(default)]
    pub title: String,
    /// Category to publish under.
    #[serde(default)]
    pub category: String,
    /// Tags to publish with.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the wallpaper is premium.
    #[serde(default)]
    pub premium: bool,
    /// Current progress.
    #[serde(default)]
    pub status: UploadStatus,
    /// Message from the last failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StagedUpload {
    /// Stage `file_name` under `id` with empty metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            title: String::new(),
            category: String::new(),
            tags: Vec::new(),
            premium: false,
            status: UploadStatus::Pending,
            error: None,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Replace the tags.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Mark as premium.
    #[must_use]
    pub const fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }
}

/// Errors raised by [`StagingQueue`].
#[derive(Debug, Error)]
pub enum StagingError {
    /// Reading the queue file failed.
    #[error("failed to read staging queue at {path}")]
    Read {
        /// Queue file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The queue file is not a valid queue.
    #[error("failed to parse staging queue at {path}")]
    Parse {
        /// Queue file path.
        path: Utf8PathBuf,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Encoding the queue failed.
    #[error("failed to encode staging queue")]
    Encode {
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Writing the queue file failed.
    #[error("failed to write staging queue at {path}")]
    Write {
        /// Queue file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An entry with this id is already queued.
    #[error("upload {id} is already staged")]
    DuplicateId {
        /// Conflicting identifier.
        id: String,
    },
    /// No entry has this id.
    #[error("upload {id} is not staged")]
    UnknownId {
        /// Requested identifier.
        id: String,
    },
    /// The entry cannot move to the requested status.
    #[error("upload {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Identifier of the entry.
        id: String,
        /// Current status.
        from: UploadStatus,
        /// Requested status.
        to: UploadStatus,
    },
}

/// Ordered upload queue persisted as JSON.
///
/// Mutations only change the in-memory queue; call [`StagingQueue::save`] to
/// persist them.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use wallery_data::{StagedUpload, StagingQueue, UploadStatus};
///
/// let dir = tempfile::tempdir()?;
/// let path = Utf8PathBuf::from_path_buf(dir.path().join("queue.json")).expect("utf-8");
///
/// let mut queue = StagingQueue::load(&path)?;
/// queue.enqueue(StagedUpload::new("u1", "dusk.jpg"))?;
/// queue.mark_uploading("u1")?;
/// queue.save()?;
///
/// let reloaded = StagingQueue::load(&path)?;
/// assert_eq!(reloaded.entries()[0].status, UploadStatus::Pending);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct StagingQueue {
    path: Utf8PathBuf,
    entries: Vec<StagedUpload>,
}

impl StagingQueue {
    /// Load the queue stored at `path`.
    ///
    /// A missing file yields an empty queue. Entries left `Uploading` by an
    /// interrupted run are reset to `Pending`.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Read`] when the file exists but cannot be read
    /// and [`StagingError::Parse`] when it is not a valid queue.
    pub fn load(path: &Utf8Path) -> Result<Self, StagingError> {
        let exists = match file_is_file(path) {
            Ok(exists) => exists,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
            Err(source) => {
                return Err(StagingError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        if !exists {
            debug!("no staging queue at {path}; starting empty");
            return Ok(Self {
                path: path.to_path_buf(),
                entries: Vec::new(),
            });
        }

        let raw = read_utf8_to_string(path).map_err(|source| StagingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut entries: Vec<StagedUpload> =
            serde_json::from_str(&raw).map_err(|source| StagingError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut reset = 0_usize;
        for entry in entries
            .iter_mut()
            .filter(|entry| entry.status == UploadStatus::Uploading)
        {
            entry.status = UploadStatus::Pending;
            reset += 1;
        }
        if reset > 0 {
            info!("reset {reset} interrupted uploads in {path} to pending");
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Persist the queue, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Encode`] or [`StagingError::Write`] when the
    /// queue cannot be written.
    pub fn save(&self) -> Result<(), StagingError> {
        let encoded = serde_json::to_vec_pretty(&self.entries)
            .map_err(|source| StagingError::Encode { source })?;
        write_atomically(&self.path, &encoded).map_err(|source| StagingError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// File backing the queue.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Every entry in queue order.
    #[must_use]
    pub fn entries(&self) -> &[StagedUpload] {
        &self.entries
    }

    /// Number of queued entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry as `Pending`.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::DuplicateId`] when the id is already queued.
    pub fn enqueue(&mut self, mut upload: StagedUpload) -> Result<(), StagingError> {
        if self.entries.iter().any(|entry| entry.id == upload.id) {
            return Err(StagingError::DuplicateId { id: upload.id });
        }
        upload.status = UploadStatus::Pending;
        upload.error = None;
        self.entries.push(upload);
        Ok(())
    }

    /// The first entry still waiting to be uploaded.
    #[must_use]
    pub fn next_pending(&self) -> Option<&StagedUpload> {
        self.entries
            .iter()
            .find(|entry| entry.status == UploadStatus::Pending)
    }

    /// Move a pending or failed entry to `Uploading`.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::UnknownId`] or
    /// [`StagingError::InvalidTransition`].
    pub fn mark_uploading(&mut self, id: &str) -> Result<(), StagingError> {
        self.transition(id, UploadStatus::Uploading, None)
    }

    /// Move an uploading entry to `Uploaded`.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::UnknownId`] or
    /// [`StagingError::InvalidTransition`].
    pub fn mark_uploaded(&mut self, id: &str) -> Result<(), StagingError> {
        self.transition(id, UploadStatus::Uploaded, None)
    }

    /// Move an uploading entry to `Failed`, keeping `error` for display.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::UnknownId`] or
    /// [`StagingError::InvalidTransition`].
    pub fn mark_failed(&mut self, id: &str, error: impl Into<String>) -> Result<(), StagingError> {
        self.transition(id, UploadStatus::Failed, Some(error.into()))
    }

    /// Drop an entry from the queue, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::UnknownId`] when no entry has the id.
    pub fn remove(&mut self, id: &str) -> Result<StagedUpload, StagingError> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| StagingError::UnknownId { id: id.to_owned() })?;
        Ok(self.entries.remove(position))
    }

    fn transition(
        &mut self,
        id: &str,
        to: UploadStatus,
        error: Option<String>,
    ) -> Result<(), StagingError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StagingError::UnknownId { id: id.to_owned() })?;
        let from = entry.status;
        let allowed = matches!(
            (from, to),
            (
                UploadStatus::Pending | UploadStatus::Failed,
                UploadStatus::Uploading
            ) | (
                UploadStatus::Uploading,
                UploadStatus::Uploaded | UploadStatus::Failed
            )
        );
        if !allowed {
            return Err(StagingError::InvalidTransition {
                id: id.to_owned(),
                from,
                to,
            });
        }
        entry.status = to;
        entry.error = error;
        Ok(())
    }
}
