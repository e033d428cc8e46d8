//! Fuzzy free-text search over a wallpaper snapshot.

use std::cmp::Reverse;

use log::debug;
use serde::Serialize;
use wallery_core::{MatchScore, Scorer, SearchQuery, Wallpaper};

use crate::levenshtein;
use crate::weights::SearchWeights;

/// Ranked search results plus the strength of the best signal seen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Matching wallpapers, best first.
    pub results: Vec<Wallpaper>,
    /// `true` when at least one tag, category, title or fuzzy match fired.
    ///
    /// Description-only matches and the tag-substring fallback leave this
    /// `false` so clients can label results as approximate.
    pub has_exact_matches: bool,
}

/// Edit-distance tolerant [`Scorer`] over tags, category, title and description.
///
/// For each query term the scorer adds, without deduplication:
/// - `tag_exact` when the term equals a tag,
/// - `category_exact` when the term equals the category,
/// - `title_word_exact` when the term equals a title word,
/// - `fuzzy` for every tag and every title word within tolerance,
/// - `description` when the description contains the term.
///
/// All comparisons happen on lowercased text.
///
/// # Examples
///
/// ```
/// use wallery_core::Wallpaper;
/// use wallery_scorer::FuzzyScorer;
///
/// let snapshot = vec![Wallpaper::new("w1").with_tags(["Sunset"])];
/// let outcome = FuzzyScorer::default().search("suset", &snapshot);
/// assert_eq!(outcome.results.len(), 1);
/// assert!(outcome.has_exact_matches);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuzzyScorer {
    weights: SearchWeights,
}

impl FuzzyScorer {
    /// Create a scorer with custom weights.
    #[must_use]
    pub const fn new(weights: SearchWeights) -> Self {
        Self { weights }
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &SearchWeights {
        &self.weights
    }

    /// Rank `wallpapers` against the raw query string.
    ///
    /// Results with a positive score are returned best first; ties keep
    /// snapshot order. When nothing scores, wallpapers whose tags contain any
    /// term as a substring are returned instead, ordered by downloads plus
    /// views and capped at `fallback_limit`.
    #[must_use]
    pub fn search(&self, query: &str, wallpapers: &[Wallpaper]) -> SearchOutcome {
        let parsed = SearchQuery::parse(query);
        if parsed.is_empty() {
            return SearchOutcome::default();
        }

        let (results, has_exact_matches) = rank_matches(self, &parsed, wallpapers);
        if !results.is_empty() {
            debug!(
                "search for {:?} matched {} wallpapers (exact: {has_exact_matches})",
                parsed.terms(),
                results.len()
            );
            return SearchOutcome {
                results,
                has_exact_matches,
            };
        }

        let results = tag_substring_fallback(&parsed, wallpapers, self.weights.fallback_limit);
        debug!(
            "search for {:?} fell back to {} tag-substring matches",
            parsed.terms(),
            results.len()
        );
        SearchOutcome {
            results,
            has_exact_matches: false,
        }
    }
}

impl Scorer for FuzzyScorer {
    fn score(&self, wallpaper: &Wallpaper, query: &SearchQuery) -> MatchScore {
        let tags = wallpaper.lowercase_tags();
        let category = wallpaper.category.to_lowercase();
        let title = wallpaper.title.to_lowercase();
        let title_words: Vec<&str> = title.split_whitespace().collect();
        let description = wallpaper.description.to_lowercase();

        let mut score = MatchScore::NONE;
        let mut award = |points: u64, exact: bool| {
            score.points = score.points.saturating_add(points);
            score.exact |= exact;
        };

        for term in query.terms().iter().map(String::as_str) {
            if tags.iter().any(|tag| tag == term) {
                award(self.weights.tag_exact, true);
            }
            if category == term {
                award(self.weights.category_exact, true);
            }
            if title_words.contains(&term) {
                award(self.weights.title_word_exact, true);
            }

            let tolerance = self.weights.tolerance(term);
            let near_misses = tags
                .iter()
                .map(String::as_str)
                .chain(title_words.iter().copied())
                .filter(|candidate| levenshtein(term, candidate) <= tolerance)
                .count();
            for _ in 0..near_misses {
                award(self.weights.fuzzy, true);
            }

            if description.contains(term) {
                award(self.weights.description, false);
            }
        }
        score
    }
}

/// Score every wallpaper, keep positive scores and sort best first.
///
/// Returns the ranked wallpapers and whether any strong signal matched.
#[must_use]
pub fn rank_matches<S>(
    scorer: &S,
    query: &SearchQuery,
    wallpapers: &[Wallpaper],
) -> (Vec<Wallpaper>, bool)
where
    S: Scorer + ?Sized,
{
    let mut scored: Vec<(MatchScore, &Wallpaper)> = wallpapers
        .iter()
        .map(|wallpaper| (scorer.score(wallpaper, query), wallpaper))
        .filter(|(score, _)| score.is_match())
        .collect();
    let has_exact = scored.iter().any(|(score, _)| score.exact);
    scored.sort_by_key(|(score, _)| Reverse(score.points));
    let ranked = scored
        .into_iter()
        .map(|(_, wallpaper)| wallpaper.clone())
        .collect();
    (ranked, has_exact)
}

fn tag_substring_fallback(
    query: &SearchQuery,
    wallpapers: &[Wallpaper],
    limit: usize,
) -> Vec<Wallpaper> {
    let mentions_term = |tag: &String| query.terms().iter().any(|term| tag.contains(term.as_str()));
    let mut related: Vec<&Wallpaper> = wallpapers
        .iter()
        .filter(|wallpaper| wallpaper.lowercase_tags().iter().any(mentions_term))
        .collect();
    related.sort_by_key(|wallpaper| Reverse(wallpaper.downloads.saturating_add(wallpaper.views)));
    related.into_iter().take(limit).cloned().collect()
}

/// Search with the default weights.
///
/// # Examples
///
/// ```
/// use wallery_scorer::search;
///
/// let outcome = search("   ", &[]);
/// assert!(outcome.results.is_empty());
/// assert!(!outcome.has_exact_matches);
/// ```
#[must_use]
pub fn search(query: &str, wallpapers: &[Wallpaper]) -> SearchOutcome {
    FuzzyScorer::default().search(query, wallpapers)
}
