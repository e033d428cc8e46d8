//! Unit-cost edit distance.

/// Levenshtein distance between `a` and `b`, counted in Unicode scalar values.
///
/// Insertions, deletions and substitutions each cost one. The comparison is
/// case-sensitive; callers fold case before calling.
///
/// # Examples
///
/// ```
/// use wallery_scorer::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// assert_eq!(levenshtein("sky", "sky"), 0);
/// ```
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let target: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=target.len()).collect();
    let mut current = Vec::with_capacity(previous.len());

    for (row, source_char) in a.chars().enumerate() {
        current.clear();
        let mut left = row + 1;
        current.push(left);
        let diagonals = previous.iter().zip(previous.iter().skip(1));
        for (target_char, (&diagonal, &above)) in target.iter().zip(diagonals) {
            let substitution = diagonal + usize::from(source_char != *target_char);
            left = substitution.min(above + 1).min(left + 1);
            current.push(left);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous.last().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::levenshtein;
    use rstest::rstest;

    #[rstest]
    #[case("", "", 0)]
    #[case("", "abc", 3)]
    #[case("abc", "", 3)]
    #[case("sunset", "sunset", 0)]
    #[case("kitten", "sitting", 3)]
    #[case("suset", "sunset", 1)]
    #[case("flaw", "lawn", 2)]
    #[case("Sky", "sky", 1)]
    #[case("café", "cafe", 1)]
    fn computes_edit_distance(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(levenshtein(a, b), expected);
    }
}
