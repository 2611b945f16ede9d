//! Stratification of evaluation records by difficulty label.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluator::EvaluationRecord;

/// Difficulty of a benchmark case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a label, ignoring ASCII case. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Difficulty {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Metric means over the records of one difficulty bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub count: usize,
    pub exact_match: f64,
    pub token_accuracy: f64,
    pub execution_accuracy: f64,
}

/// Partition `records` by the parallel `labels` and average each bucket.
///
/// Records are paired with labels positionally; extra entries on either side
/// are ignored, as are records whose label is not a known difficulty. Only
/// non-empty buckets appear in the result.
pub fn difficulty_breakdown<L: AsRef<str>>(
    records: &[EvaluationRecord],
    labels: &[L],
) -> BTreeMap<Difficulty, DifficultyStats> {
    let mut buckets: BTreeMap<Difficulty, Vec<&EvaluationRecord>> = BTreeMap::new();
    for (record, label) in records.iter().zip(labels) {
        if let Some(difficulty) = Difficulty::parse(label.as_ref()) {
            buckets.entry(difficulty).or_default().push(record);
        }
    }

    buckets
        .into_iter()
        .map(|(difficulty, members)| {
            let n = members.len() as f64;
            let mean = |f: fn(&EvaluationRecord) -> f64| members.iter().map(|r| f(r)).sum::<f64>() / n;
            let stats = DifficultyStats {
                count: members.len(),
                exact_match: mean(|r| r.exact_match),
                token_accuracy: mean(|r| r.token_accuracy),
                execution_accuracy: mean(|r| r.execution_accuracy),
            };
            (difficulty, stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(exact_match: f64, token_accuracy: f64) -> EvaluationRecord {
        EvaluationRecord {
            question: String::new(),
            predicted: String::new(),
            ground_truth: String::new(),
            exact_match,
            token_accuracy,
            execution_accuracy: 0.0,
            execution_message: "No database connection".into(),
        }
    }

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!(Difficulty::parse("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("Medium"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse("extreme"), None);
    }

    #[test]
    fn buckets_by_label_and_skips_unknown() {
        let records = vec![record(1.0, 1.0), record(0.0, 0.8), record(1.0, 1.0), record(0.0, 0.0)];
        let labels = ["easy", "medium", "easy", "unknown"];
        let breakdown = difficulty_breakdown(&records, &labels);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[&Difficulty::Easy].count, 2);
        assert_eq!(breakdown[&Difficulty::Easy].exact_match, 1.0);
        assert!((breakdown[&Difficulty::Medium].token_accuracy - 0.8).abs() < 1e-12);
        assert!(!breakdown.contains_key(&Difficulty::Hard));
    }

    #[test]
    fn serializes_as_lowercase_label() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
    }
}
