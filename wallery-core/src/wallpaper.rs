//! The wallpaper entity and its builder-style constructors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published wallpaper as seen by browsing, search and recommendations.
///
/// Tags keep the casing they were stored with so they can be displayed
/// verbatim; every matching routine lowercases before comparing.
///
/// # Examples
///
/// ```
/// use wallery_core::Wallpaper;
///
/// let wallpaper = Wallpaper::new("w1")
///     .with_title("Golden Sunset")
///     .with_category("Nature")
///     .with_tags(["Sunset", "sky"]);
///
/// assert!(wallpaper.has_tag("sunset"));
/// assert_eq!(wallpaper.tags, vec!["Sunset".to_owned(), "sky".to_owned()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wallpaper {
    /// Opaque document identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Name of the owning [`Category`](crate::Category).
    pub category: String,
    /// Tags in display order and display casing.
    pub tags: Vec<String>,
    /// Location of the original image in object storage.
    pub image_url: String,
    /// Number of recorded downloads.
    pub downloads: u64,
    /// Number of current likes.
    pub likes: u64,
    /// Number of recorded views.
    pub views: u64,
    /// Whether the wallpaper requires a premium subscription.
    pub premium: bool,
    /// Whether the wallpaper is an exclusive release.
    pub is_exclusive: bool,
    /// Publication time, when known.
    pub created_at: Option<DateTime<Utc>>,
    /// Time of the last edit, when known.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Wallpaper {
    /// Create an otherwise empty wallpaper with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the owning category name.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Replace the tag list.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the object storage location of the original image.
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Set the download, like and view counters.
    #[must_use]
    pub const fn with_engagement(mut self, downloads: u64, likes: u64, views: u64) -> Self {
        self.downloads = downloads;
        self.likes = likes;
        self.views = views;
        self
    }

    /// Mark the wallpaper as premium-only.
    #[must_use]
    pub const fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    /// Mark the wallpaper as an exclusive release.
    #[must_use]
    pub const fn with_exclusive(mut self, is_exclusive: bool) -> Self {
        self.is_exclusive = is_exclusive;
        self
    }

    /// Set the publication timestamp.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Tags folded to lowercase, in display order.
    #[must_use]
    pub fn lowercase_tags(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.to_lowercase()).collect()
    }

    /// Case-insensitive tag membership.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|candidate| candidate.to_lowercase() == needle)
    }
}
