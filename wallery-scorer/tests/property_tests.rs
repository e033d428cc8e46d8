//! Property-based tests for edit distance and search ranking.
//!
//! # Invariants tested
//!
//! - **Identity:** a string is at distance zero from itself.
//! - **Symmetry:** distance does not depend on argument order.
//! - **Bounds:** distance lies between the length difference and the longer length.
//! - **Triangle inequality:** no detour is shorter than the direct path.
//! - **Ranking:** search results are sorted by descending score and all positive.

use proptest::prelude::*;
use wallery_core::{Scorer, SearchQuery, Wallpaper};
use wallery_scorer::{FuzzyScorer, levenshtein, search};

/// Short lowercase words so that near misses actually occur.
fn word() -> impl Strategy<Value = String> {
    "[a-eé]{0,7}"
}

fn wallpaper_strategy() -> impl Strategy<Value = Wallpaper> {
    (
        proptest::collection::vec(word(), 0..4),
        word(),
        proptest::collection::vec(word(), 0..3),
    )
        .prop_map(|(tags, category, title_words)| {
            Wallpaper::new("w")
                .with_tags(tags)
                .with_category(category)
                .with_title(title_words.join(" "))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn distance_to_self_is_zero(a in word()) {
        prop_assert_eq!(levenshtein(&a, &a), 0);
    }

    #[test]
    fn distance_is_symmetric(a in word(), b in word()) {
        prop_assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
    }

    #[test]
    fn distance_is_bounded_by_lengths(a in word(), b in word()) {
        let (len_a, len_b) = (a.chars().count(), b.chars().count());
        let distance = levenshtein(&a, &b);
        prop_assert!(distance >= len_a.abs_diff(len_b));
        prop_assert!(distance <= len_a.max(len_b));
    }

    #[test]
    fn distance_obeys_triangle_inequality(a in word(), b in word(), c in word()) {
        prop_assert!(levenshtein(&a, &c) <= levenshtein(&a, &b) + levenshtein(&b, &c));
    }

    #[test]
    fn results_are_sorted_by_score(
        mut snapshot in proptest::collection::vec(wallpaper_strategy(), 0..12),
        query in "[a-eé ]{0,12}",
    ) {
        for (index, wallpaper) in snapshot.iter_mut().enumerate() {
            wallpaper.id = format!("w{index}");
        }
        let scorer = FuzzyScorer::default();
        let parsed = SearchQuery::parse(&query);
        let outcome = search(&query, &snapshot);
        let scored: Vec<u64> = outcome
            .results
            .iter()
            .map(|wallpaper| scorer.score(wallpaper, &parsed).points)
            .collect();
        let any_positive = snapshot
            .iter()
            .any(|wallpaper| scorer.score(wallpaper, &parsed).is_match());
        if any_positive {
            prop_assert!(scored.iter().all(|points| *points > 0));
            prop_assert!(scored.windows(2).all(|pair| pair.first() >= pair.last()));
        }
    }
}
