//! Property tests for SQL normalization and the text scorers.

use proptest::prelude::*;
use t2s_eval::{exact_match_score, normalize_sql, token_level_accuracy};

const TOKENS: &[&str] = &[
    "SELECT", "select", "FROM", "film", "actor", "WHERE", "title", "=", "'PG'", "COUNT(*)", ",", ";", "名字",
];

/// SQL-ish text with irregular whitespace and stray terminators.
fn arb_sql() -> impl Strategy<Value = String> {
    let sep = prop_oneof![Just(" "), Just("  "), Just("\n"), Just("\t "), Just(";")];
    proptest::collection::vec((proptest::sample::select(TOKENS), sep), 0..12)
        .prop_map(|parts| parts.into_iter().map(|(token, sep)| format!("{token}{sep}")).collect::<String>())
}

/// **Property: normalization is idempotent**
mod prop_normalize {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn normalize_is_idempotent(sql in arb_sql()) {
            let once = normalize_sql(&sql);
            prop_assert_eq!(normalize_sql(&once), once.clone());
        }

        #[test]
        fn normalize_is_idempotent_on_arbitrary_text(sql in ".*") {
            let once = normalize_sql(&sql);
            prop_assert_eq!(normalize_sql(&once), once.clone());
        }

        #[test]
        fn normalized_text_has_no_outer_whitespace_or_terminator(sql in arb_sql()) {
            let normalized = normalize_sql(&sql);
            prop_assert!(!normalized.ends_with(';'));
            prop_assert_eq!(normalized.trim(), normalized.as_str());
            prop_assert!(!normalized.contains("  "));
        }
    }
}

/// **Property: scorers are pure and bounded**
mod prop_scores {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn exact_match_is_pure_and_symmetric(a in arb_sql(), b in arb_sql()) {
            let score = exact_match_score(&a, &b);
            prop_assert_eq!(score, exact_match_score(&a, &b));
            prop_assert_eq!(score, exact_match_score(&b, &a));
            prop_assert!(score == 0.0 || score == 1.0);
        }

        #[test]
        fn token_accuracy_in_unit_interval(a in arb_sql(), b in arb_sql()) {
            let score = token_level_accuracy(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score), "score out of range: {}", score);
        }

        #[test]
        fn self_similarity_is_one(a in arb_sql()) {
            prop_assert_eq!(exact_match_score(&a, &a), 1.0);
            prop_assert_eq!(token_level_accuracy(&a, &a), 1.0);
        }

        #[test]
        fn exact_match_implies_full_token_accuracy(a in arb_sql(), b in arb_sql()) {
            if exact_match_score(&a, &b) == 1.0 {
                prop_assert_eq!(token_level_accuracy(&a, &b), 1.0);
            }
        }
    }
}
