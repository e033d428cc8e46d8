//! Score wallpapers against a free-text query.
//!
//! The `Scorer` trait assigns a relevance score to a [`Wallpaper`] given a
//! parsed [`SearchQuery`]. Search pipelines keep wallpapers whose score is
//! positive and sort them by descending points.

use crate::Wallpaper;

/// A normalised free-text query: trimmed, lowercased and split on whitespace.
///
/// # Examples
///
/// ```
/// use wallery_core::SearchQuery;
///
/// let query = SearchQuery::parse("  Golden   SUNSET ");
/// assert_eq!(query.terms(), ["golden", "sunset"]);
/// assert!(SearchQuery::parse("   ").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Normalise raw user input into search terms.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let terms = raw
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        Self { terms }
    }

    /// Lowercased terms in input order.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Report whether no terms survived normalisation.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The outcome of scoring one wallpaper against one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScore {
    /// Accumulated relevance points.
    pub points: u64,
    /// Whether any strong (tag, category, title or fuzzy) signal matched.
    pub exact: bool,
}

impl MatchScore {
    /// A score representing no match at all.
    pub const NONE: Self = Self {
        points: 0,
        exact: false,
    };

    /// Report whether the wallpaper should appear in results.
    #[must_use]
    pub const fn is_match(self) -> bool {
        self.points > 0
    }
}

/// Calculate query relevance for a wallpaper.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so one scorer can
/// serve concurrent requests. Scoring is infallible and must be
/// deterministic for identical inputs.
///
/// # Examples
///
/// ```rust
/// use wallery_core::{MatchScore, Scorer, SearchQuery, Wallpaper};
///
/// struct TagHits;
///
/// impl Scorer for TagHits {
///     fn score(&self, wallpaper: &Wallpaper, query: &SearchQuery) -> MatchScore {
///         let hits = query.terms().iter().filter(|t| wallpaper.has_tag(t)).count();
///         MatchScore { points: hits as u64, exact: hits > 0 }
///     }
/// }
///
/// let wallpaper = Wallpaper::new("w1").with_tags(["Sky"]);
/// let score = TagHits.score(&wallpaper, &SearchQuery::parse("sky"));
/// assert!(score.is_match());
/// ```
pub trait Scorer: Send + Sync {
    /// Return the relevance of `wallpaper` for `query`.
    fn score(&self, wallpaper: &Wallpaper, query: &SearchQuery) -> MatchScore;
}
