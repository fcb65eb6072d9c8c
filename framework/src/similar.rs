//! Name similarity ranking used for "did you mean" suggestions.
//!
//! Similarity between two names is the length of their longest common subsequence (compared
//! case-insensitively) as a percentage of the longer of the two names.

use std::fmt;

/// Default number of suggestions reported alongside a failed lookup.
pub const SUGGESTION_COUNT: usize = 5;

/// A candidate name together with its similarity to the requested name.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    name: String,
    score: f32,
}

impl Suggestion {
    /// Construct a suggestion with a precomputed score.
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// The suggested name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Percentage similarity in `0.0..=100.0`.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}% similar)", self.name, self.score)
    }
}

/// Length of the longest common subsequence of `a` and `b`.
pub fn longest_common_subsequence(a: &str, b: &str, case_sensitive: bool) -> usize {
    let fold = |s: &str| -> Vec<char> {
        if case_sensitive {
            s.chars().collect()
        } else {
            s.chars().flat_map(char::to_lowercase).collect()
        }
    };
    let a = fold(a);
    let b = fold(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Two rolling rows of the classic dynamic programming table.
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Percentage similarity of two names.
pub fn similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    longest_common_subsequence(a, b, false) as f32 * 100.0 / longest as f32
}

/// Rank `candidates` by similarity to `name`, most similar first, keeping at most `count`.
///
/// Candidates with equal scores keep their original relative order.
pub fn rank<'a, I>(name: &str, candidates: I, count: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<Suggestion> = candidates
        .into_iter()
        .map(|candidate| Suggestion::new(candidate, similarity(candidate, name)))
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(count);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcs_of_identical_strings_is_their_length() {
        assert_eq!(longest_common_subsequence("Mesh", "Mesh", true), 4);
    }

    #[test]
    fn lcs_ignores_case_when_asked() {
        assert_eq!(longest_common_subsequence("MESH", "mesh", true), 0);
        assert_eq!(longest_common_subsequence("MESH", "mesh", false), 4);
    }

    #[test]
    fn lcs_is_a_subsequence_not_a_substring() {
        assert_eq!(longest_common_subsequence("abcde", "ace", true), 3);
        assert_eq!(longest_common_subsequence("FeMesh", "Mesh_Fe", true), 4);
    }

    #[test]
    fn similarity_is_normalised_by_longer_name() {
        // Given - "Mesh" is fully contained (as a subsequence) in "FeMesh"
        let score = similarity("Mesh", "FeMesh");

        // Then
        assert!((score - 4.0 * 100.0 / 6.0).abs() < 1e-4);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn rank_orders_by_descending_score() {
        // Given
        let candidates = ["Swarm", "FeMesh", "Mesh", "Field"];

        // When
        let ranked = rank("Mesh", candidates.iter().copied(), 3);

        // Then
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].name(), "Mesh");
        assert_eq!(ranked[1].name(), "FeMesh");
        assert!(ranked.windows(2).all(|w| w[0].score() >= w[1].score()));
    }

    #[test]
    fn suggestion_display_has_two_decimals() {
        assert_eq!(Suggestion::new("Mesh", 66.666_67).to_string(), "Mesh (66.67% similar)");
    }
}
