//! Scoring weights for search and recommendations.
//!
//! The `Default` impls carry the production constants. Changing them
//! changes result ordering for every client, so treat them as part of the
//! public contract.

use serde::{Deserialize, Serialize};

/// Points and tolerances used by the fuzzy search ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchWeights {
    /// Awarded when a term equals one of the wallpaper's tags.
    pub tag_exact: u64,
    /// Awarded when a term equals the wallpaper's category.
    pub category_exact: u64,
    /// Awarded when a term equals a word of the title.
    pub title_word_exact: u64,
    /// Awarded for every tag or title word within edit-distance tolerance.
    pub fuzzy: u64,
    /// Awarded when the description contains the term.
    pub description: u64,
    /// Terms longer than this many characters use `long_distance`.
    pub long_term_len: usize,
    /// Edit-distance tolerance for short terms.
    pub short_distance: usize,
    /// Edit-distance tolerance for long terms.
    pub long_distance: usize,
    /// Maximum number of tag-substring fallback results.
    pub fallback_limit: usize,
}

impl Default for SearchWeights {
    fn default() -> Self {
        Self {
            tag_exact: 15,
            category_exact: 10,
            title_word_exact: 10,
            fuzzy: 5,
            description: 1,
            long_term_len: 5,
            short_distance: 1,
            long_distance: 2,
            fallback_limit: 20,
        }
    }
}

impl SearchWeights {
    /// Maximum edit distance tolerated for `term`.
    ///
    /// Length is counted in characters, not bytes.
    #[must_use]
    pub fn tolerance(&self, term: &str) -> usize {
        if term.chars().count() > self.long_term_len {
            self.long_distance
        } else {
            self.short_distance
        }
    }
}

/// Points used by the related-wallpaper scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedWeights {
    /// Awarded per candidate tag shared with the current wallpaper.
    pub tag_overlap: u64,
    /// Awarded when the candidate shares the current wallpaper's category.
    pub category_bonus: u64,
}

impl Default for RelatedWeights {
    fn default() -> Self {
        Self {
            tag_overlap: 20,
            category_bonus: 50,
        }
    }
}
