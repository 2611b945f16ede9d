//! SQL normalization and the text-based scorers.

use crate::sequence::sequence_ratio;

/// Normalize a SQL string for comparison.
///
/// Collapses whitespace runs to single spaces, lowercases, and strips the
/// trailing statement terminator. Any whitespace or further `;` exposed by the
/// strip is removed too, which keeps the function idempotent.
pub fn normalize_sql(sql: &str) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    collapsed.trim_end_matches(|c: char| c == ';' || c.is_whitespace()).to_string()
}

/// `1.0` if both statements normalize to the same string, else `0.0`.
pub fn exact_match_score(predicted: &str, ground_truth: &str) -> f64 {
    if normalize_sql(predicted) == normalize_sql(ground_truth) { 1.0 } else { 0.0 }
}

/// Sequence similarity of the whitespace-separated normalized tokens.
///
/// Returns `2 * matches / (len(predicted) + len(ground_truth))`. An empty
/// ground truth scores `1.0` against an empty prediction and `0.0` otherwise.
/// Ground truths of 200 or more tokens ignore their most frequent tokens when
/// seeding matches; see [`crate::sequence`].
pub fn token_level_accuracy(predicted: &str, ground_truth: &str) -> f64 {
    let predicted = normalize_sql(predicted);
    let ground_truth = normalize_sql(ground_truth);
    let pred_tokens: Vec<&str> = predicted.split(' ').filter(|t| !t.is_empty()).collect();
    let gt_tokens: Vec<&str> = ground_truth.split(' ').filter(|t| !t.is_empty()).collect();

    if gt_tokens.is_empty() {
        return if pred_tokens.is_empty() { 1.0 } else { 0.0 };
    }
    sequence_ratio(&pred_tokens, &gt_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_ignores_case_whitespace_and_terminator() {
        assert_eq!(normalize_sql("SELECT  a\n FROM b;"), "select a from b");
        assert_eq!(normalize_sql("select 1 ;"), "select 1");
        assert_eq!(normalize_sql("select 1;;"), "select 1");
        assert_eq!(normalize_sql(""), "");
    }

    #[test]
    fn exact_match_is_insensitive_to_formatting() {
        assert_eq!(exact_match_score("SELECT a FROM b;", "select a from b"), 1.0);
        assert_eq!(exact_match_score("SELECT a FROM b", "SELECT a FROM c"), 0.0);
    }

    #[test]
    fn token_accuracy_boundaries() {
        assert_eq!(token_level_accuracy("", ""), 1.0);
        assert_eq!(token_level_accuracy("SELECT 1", ""), 0.0);
        assert_eq!(token_level_accuracy("", "SELECT 1"), 0.0);
    }

    #[test]
    fn token_accuracy_counts_shared_tokens() {
        // 3 of 4 tokens shared on each side: 2 * 3 / 8
        assert!((token_level_accuracy("select a from b", "SELECT a FROM c") - 0.75).abs() < 1e-12);
        assert_eq!(token_level_accuracy("SELECT title FROM film", "select title from film;"), 1.0);
    }
}
