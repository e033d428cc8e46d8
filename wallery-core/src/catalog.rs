//! Catalog groupings: categories and curated collections.

use serde::{Deserialize, Serialize};

/// A browsable category.
///
/// `wallpaper_count` is a derived counter maintained by increment and
/// decrement calls next to wallpaper writes. It is not recomputed from the
/// wallpapers themselves, so it can drift if a write skips the adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    /// Unique display name referenced by [`Wallpaper::category`](crate::Wallpaper::category).
    pub name: String,
    /// Number of wallpapers currently filed under this category.
    pub wallpaper_count: u64,
}

impl Category {
    /// Create a category with a zero count.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wallpaper_count: 0,
        }
    }

    /// Set the stored wallpaper count.
    #[must_use]
    pub const fn with_count(mut self, wallpaper_count: u64) -> Self {
        self.wallpaper_count = wallpaper_count;
        self
    }
}

/// A curated, ordered set of wallpapers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Collection {
    /// Opaque document identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Member wallpaper identifiers in curated order.
    pub wallpaper_ids: Vec<String>,
    /// Number of recorded collection page views.
    pub views: u64,
    /// Number of recorded bulk downloads.
    pub downloads: u64,
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Replace the member list.
    #[must_use]
    pub fn with_wallpapers<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.wallpaper_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}
