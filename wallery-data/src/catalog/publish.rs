//! Scheduled publication of draft wallpapers.

use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::params;
use wallery_core::Wallpaper;

use super::{CatalogWriteError, CatalogWriter, commit, insert_wallpaper, wallpaper_exists};

/// A draft waiting in the schedule.
struct ScheduledRow {
    id: String,
    payload: String,
    publish_at: i64,
}

impl CatalogWriter {
    /// Queue `wallpaper` for publication at `publish_at`.
    ///
    /// Scheduling the same id again replaces the earlier draft.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::MissingId`] for a blank id,
    /// [`CatalogWriteError::SerializeJson`] when the draft cannot be encoded
    /// and [`CatalogWriteError::Sqlite`] when the insert fails.
    pub fn schedule_wallpaper(
        &mut self,
        wallpaper: &Wallpaper,
        publish_at: DateTime<Utc>,
    ) -> Result<(), CatalogWriteError> {
        if wallpaper.id.trim().is_empty() {
            return Err(CatalogWriteError::MissingId);
        }
        let payload =
            serde_json::to_string(wallpaper).map_err(|source| CatalogWriteError::SerializeJson {
                id: wallpaper.id.clone(),
                source,
            })?;
        self.connection
            .execute(
                "INSERT OR REPLACE INTO scheduled_wallpapers (id, payload, publish_at) \
                 VALUES (?1, ?2, ?3)",
                params![wallpaper.id, payload, publish_at.timestamp_millis()],
            )
            .map_err(|source| CatalogWriteError::sqlite("schedule wallpaper", source))?;
        info!("scheduled wallpaper {} for {publish_at}", wallpaper.id);
        Ok(())
    }

    /// Publish every draft due at or before `now`.
    ///
    /// Drafts publish in `publish_at` order through the same insert path as
    /// [`CatalogWriter::create_wallpaper`], stamped with their scheduled time
    /// as `created_at`, and all in one transaction. A draft whose payload no
    /// longer decodes, or whose id is already published, is logged and left
    /// in the schedule. Returns the ids that were published.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::Sqlite`] when a statement fails, in which
    /// case nothing is published.
    pub fn publish_due(&mut self, now: DateTime<Utc>) -> Result<Vec<String>, CatalogWriteError> {
        let transaction = self.begin()?;
        let due = {
            let query_error = |source| CatalogWriteError::sqlite("list due drafts", source);
            let mut statement = transaction
                .prepare(
                    "SELECT id, payload, publish_at FROM scheduled_wallpapers \
                     WHERE publish_at <= ?1 ORDER BY publish_at, id",
                )
                .map_err(query_error)?;
            statement
                .query_map([now.timestamp_millis()], |row| {
                    Ok(ScheduledRow {
                        id: row.get(0)?,
                        payload: row.get(1)?,
                        publish_at: row.get(2)?,
                    })
                })
                .map_err(query_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(query_error)?
        };

        let mut published = Vec::with_capacity(due.len());
        for row in due {
            let mut draft: Wallpaper = match serde_json::from_str(&row.payload) {
                Ok(draft) => draft,
                Err(err) => {
                    warn!("leaving scheduled wallpaper {} unpublished: {err}", row.id);
                    continue;
                }
            };
            if wallpaper_exists(&transaction, &row.id)? {
                warn!("leaving scheduled wallpaper {} unpublished: id already exists", row.id);
                continue;
            }
            draft.id.clone_from(&row.id);
            draft.created_at = DateTime::from_timestamp_millis(row.publish_at).or(Some(now));
            draft.updated_at = None;

            insert_wallpaper(&transaction, &draft, now)?;
            transaction
                .execute("DELETE FROM scheduled_wallpapers WHERE id = ?1", [&row.id])
                .map_err(|source| CatalogWriteError::sqlite("clear published draft", source))?;
            published.push(row.id);
        }

        commit(transaction)?;
        if !published.is_empty() {
            info!("published {} scheduled wallpapers", published.len());
        }
        Ok(published)
    }

    /// Number of drafts still waiting in the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogWriteError::Sqlite`] when the query fails.
    pub fn scheduled_count(&self) -> Result<usize, CatalogWriteError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM scheduled_wallpapers", [], |row| {
                row.get(0)
            })
            .map_err(|source| CatalogWriteError::sqlite("count scheduled drafts", source))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
