//! Site-wide popularity weighting.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::Wallpaper;

/// Multipliers applied to engagement counters when ranking by popularity.
///
/// The defaults (`downloads × 5 + likes × 3 + views × 1`) are used
/// everywhere the catalog ranks "popular" wallpapers. Treat them as
/// compatibility constants rather than tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularityWeights {
    /// Multiplier applied to the download counter.
    pub downloads: u64,
    /// Multiplier applied to the like counter.
    pub likes: u64,
    /// Multiplier applied to the view counter.
    pub views: u64,
}

impl Default for PopularityWeights {
    fn default() -> Self {
        Self {
            downloads: 5,
            likes: 3,
            views: 1,
        }
    }
}

impl PopularityWeights {
    /// Weighted engagement score for a wallpaper.
    ///
    /// Arithmetic saturates rather than wrapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use wallery_core::{PopularityWeights, Wallpaper};
    ///
    /// let wallpaper = Wallpaper::new("w1").with_engagement(2, 1, 10);
    /// assert_eq!(PopularityWeights::default().score(&wallpaper), 23);
    /// ```
    #[must_use]
    pub const fn score(self, wallpaper: &Wallpaper) -> u64 {
        self.downloads
            .saturating_mul(wallpaper.downloads)
            .saturating_add(self.likes.saturating_mul(wallpaper.likes))
            .saturating_add(self.views.saturating_mul(wallpaper.views))
    }
}

/// Sort wallpapers by descending popularity.
///
/// The sort is stable: equally popular wallpapers keep their input order.
#[must_use]
pub fn rank_by_popularity(mut wallpapers: Vec<Wallpaper>, weights: PopularityWeights) -> Vec<Wallpaper> {
    wallpapers.sort_by_cached_key(|wallpaper| Reverse(weights.score(wallpaper)));
    wallpapers
}

/// The `count` most popular wallpapers, most popular first.
#[must_use]
pub fn most_popular(
    wallpapers: Vec<Wallpaper>,
    count: usize,
    weights: PopularityWeights,
) -> Vec<Wallpaper> {
    let mut ranked = rank_by_popularity(wallpapers, weights);
    ranked.truncate(count);
    ranked
}
