//! "More like this" recommendations.

use std::cmp::Reverse;
use std::collections::HashSet;

use log::debug;
use wallery_core::{PopularityWeights, Wallpaper, most_popular};

use crate::weights::RelatedWeights;

/// Ranks candidates by tag overlap and shared category with a reference
/// wallpaper, breaking ties by popularity.
///
/// Tag comparison is case-insensitive; category comparison is exact.
///
/// # Examples
///
/// ```
/// use wallery_core::Wallpaper;
/// use wallery_scorer::RelatedScorer;
///
/// let current = Wallpaper::new("c").with_category("Nature").with_tags(["Forest"]);
/// let candidates = vec![
///     Wallpaper::new("same-category").with_category("Nature"),
///     Wallpaper::new("shared-tag").with_category("City").with_tags(["forest"]),
///     Wallpaper::new("unrelated").with_category("City"),
/// ];
/// let related = RelatedScorer::default().related(&current, &candidates, 10, &["c"]);
/// let ids: Vec<_> = related.iter().map(|w| w.id.as_str()).collect();
/// assert_eq!(ids, ["same-category", "shared-tag"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelatedScorer {
    weights: RelatedWeights,
    popularity: PopularityWeights,
}

impl RelatedScorer {
    /// Create a scorer with custom weights.
    #[must_use]
    pub const fn new(weights: RelatedWeights, popularity: PopularityWeights) -> Self {
        Self {
            weights,
            popularity,
        }
    }

    /// Weights used for the relatedness score.
    #[must_use]
    pub const fn weights(&self) -> &RelatedWeights {
        &self.weights
    }

    /// Weights used for the popularity tie-break and fallback.
    #[must_use]
    pub const fn popularity(&self) -> &PopularityWeights {
        &self.popularity
    }

    /// Relatedness of `candidate` to `current`.
    ///
    /// Each candidate tag found among `current`'s tags adds `tag_overlap`;
    /// duplicated candidate tags count once per occurrence.
    #[must_use]
    pub fn score(&self, current: &Wallpaper, candidate: &Wallpaper) -> u64 {
        let current_tags: HashSet<String> = current.lowercase_tags().into_iter().collect();
        self.score_against(&current_tags, &current.category, candidate)
    }

    fn score_against(
        &self,
        current_tags: &HashSet<String>,
        current_category: &str,
        candidate: &Wallpaper,
    ) -> u64 {
        let shared = candidate
            .tags
            .iter()
            .filter(|tag| current_tags.contains(&tag.to_lowercase()))
            .count();
        let tag_points = u64::try_from(shared)
            .unwrap_or(u64::MAX)
            .saturating_mul(self.weights.tag_overlap);
        let category_points = if candidate.category == current_category {
            self.weights.category_bonus
        } else {
            0
        };
        tag_points.saturating_add(category_points)
    }

    /// Candidates with a positive relatedness score, best first, at most `limit`.
    ///
    /// Candidates whose id appears in `exclude_ids` are skipped. Equal scores
    /// are ordered by popularity, then by snapshot order.
    #[must_use]
    pub fn related<S: AsRef<str>>(
        &self,
        current: &Wallpaper,
        candidates: &[Wallpaper],
        limit: usize,
        exclude_ids: &[S],
    ) -> Vec<Wallpaper> {
        let excluded = exclusion_set(exclude_ids);
        let current_tags: HashSet<String> = current.lowercase_tags().into_iter().collect();

        let mut scored: Vec<(u64, u64, &Wallpaper)> = candidates
            .iter()
            .filter(|candidate| !excluded.contains(candidate.id.as_str()))
            .map(|candidate| {
                let score = self.score_against(&current_tags, &current.category, candidate);
                (score, self.popularity.score(candidate), candidate)
            })
            .filter(|(score, _, _)| *score > 0)
            .collect();
        scored.sort_by_key(|(score, popularity, _)| (Reverse(*score), Reverse(*popularity)));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, _, wallpaper)| wallpaper.clone())
            .collect()
    }

    /// Like [`related`](Self::related), but falls back to the most popular
    /// non-excluded candidates when nothing is related.
    #[must_use]
    pub fn related_or_popular<S: AsRef<str>>(
        &self,
        current: &Wallpaper,
        candidates: &[Wallpaper],
        limit: usize,
        exclude_ids: &[S],
    ) -> Vec<Wallpaper> {
        let related = self.related(current, candidates, limit, exclude_ids);
        if !related.is_empty() {
            return related;
        }
        debug!("no wallpapers related to {}; using popular fallback", current.id);
        let excluded = exclusion_set(exclude_ids);
        let remaining = candidates
            .iter()
            .filter(|candidate| !excluded.contains(candidate.id.as_str()))
            .cloned()
            .collect();
        most_popular(remaining, limit, self.popularity)
    }
}

pub(crate) fn exclusion_set<S: AsRef<str>>(exclude_ids: &[S]) -> HashSet<&str> {
    exclude_ids.iter().map(AsRef::as_ref).collect()
}

/// Related wallpapers with the default weights and popular fallback.
#[must_use]
pub fn related_wallpapers<S: AsRef<str>>(
    current: &Wallpaper,
    candidates: &[Wallpaper],
    limit: usize,
    exclude_ids: &[S],
) -> Vec<Wallpaper> {
    RelatedScorer::default().related_or_popular(current, candidates, limit, exclude_ids)
}
