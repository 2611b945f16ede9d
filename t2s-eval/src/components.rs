//! Clause-level comparison of SQL statements.
//!
//! This is a best-effort diagnostic, not a parser. [`HeuristicClauseExtractor`]
//! finds clauses by literal keyword search, so it is unreliable for statements
//! that use keywords inside identifiers or string literals and for nested
//! subqueries. Plug a real tokenizer in through [`ClauseExtractor`] when that
//! matters.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_sql;

/// A clause bucket of a `SELECT` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Select,
    From,
    Where,
    Join,
    GroupBy,
    OrderBy,
    Having,
    Limit,
}

impl Clause {
    pub const ALL: [Clause; 8] = [
        Clause::Select,
        Clause::From,
        Clause::Where,
        Clause::Join,
        Clause::GroupBy,
        Clause::OrderBy,
        Clause::Having,
        Clause::Limit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Clause::Select => "select",
            Clause::From => "from",
            Clause::Where => "where",
            Clause::Join => "join",
            Clause::GroupBy => "group_by",
            Clause::OrderBy => "order_by",
            Clause::Having => "having",
            Clause::Limit => "limit",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a SQL statement into per-clause item lists.
pub trait ClauseExtractor {
    /// Items found for each clause. Clauses absent from the map are empty.
    fn extract(&self, sql: &str) -> BTreeMap<Clause, Vec<String>>;
}

/// Keyword-search extractor filling the select and from buckets.
///
/// The select list is everything before the first `from` with `select`
/// removed. The from list is the text between the first and second `from`,
/// cut at the first `where`, `join`, `group by` or `order by`. Both are split
/// on commas.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClauseExtractor;

const FROM_TERMINATORS: [&str; 4] = ["where", "join", "group by", "order by"];

impl ClauseExtractor for HeuristicClauseExtractor {
    fn extract(&self, sql: &str) -> BTreeMap<Clause, Vec<String>> {
        let sql = normalize_sql(sql);
        let mut clauses = BTreeMap::new();

        if sql.contains("select") {
            let head = sql.split("from").next().unwrap_or_default();
            clauses.insert(Clause::Select, split_items(&head.replace("select", "")));
        }

        if let Some(tail) = sql.split("from").nth(1) {
            let from_part = FROM_TERMINATORS
                .iter()
                .fold(tail, |part, keyword| part.split(keyword).next().unwrap_or_default());
            clauses.insert(Clause::From, split_items(from_part));
        }

        clauses
    }
}

fn split_items(part: &str) -> Vec<String> {
    part.trim().split(',').map(|item| item.trim().to_string()).collect()
}

/// Per-clause Jaccard similarity using [`HeuristicClauseExtractor`].
pub fn component_accuracy(predicted: &str, ground_truth: &str) -> BTreeMap<Clause, f64> {
    component_accuracy_with(&HeuristicClauseExtractor, predicted, ground_truth)
}

/// Per-clause Jaccard similarity between the item sets of both statements.
///
/// Every clause in [`Clause::ALL`] is reported. A clause empty on the
/// ground-truth side scores `1.0` if it is also empty in the prediction and
/// `0.0` otherwise.
pub fn component_accuracy_with(
    extractor: &dyn ClauseExtractor,
    predicted: &str,
    ground_truth: &str,
) -> BTreeMap<Clause, f64> {
    let predicted = extractor.extract(predicted);
    let ground_truth = extractor.extract(ground_truth);

    Clause::ALL
        .into_iter()
        .map(|clause| {
            let pred: BTreeSet<&str> = items(&predicted, clause).collect();
            let truth: BTreeSet<&str> = items(&ground_truth, clause).collect();
            let score = if truth.is_empty() {
                if pred.is_empty() { 1.0 } else { 0.0 }
            } else {
                let union = pred.union(&truth).count();
                pred.intersection(&truth).count() as f64 / union as f64
            };
            (clause, score)
        })
        .collect()
}

fn items(clauses: &BTreeMap<Clause, Vec<String>>, clause: Clause) -> impl Iterator<Item = &str> {
    clauses.get(&clause).into_iter().flatten().map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_select_and_from_lists() {
        let clauses = HeuristicClauseExtractor.extract("SELECT first_name, last_name FROM actor WHERE actor_id = 1");
        assert_eq!(clauses[&Clause::Select], vec!["first_name", "last_name"]);
        assert_eq!(clauses[&Clause::From], vec!["actor"]);
        assert!(!clauses.contains_key(&Clause::Where));
    }

    #[test]
    fn from_list_stops_at_join() {
        let clauses = HeuristicClauseExtractor.extract("SELECT f.title FROM film f JOIN film_actor fa ON f.film_id = fa.film_id");
        assert_eq!(clauses[&Clause::From], vec!["film f"]);
    }

    #[test]
    fn identical_statements_score_one_everywhere() {
        let sql = "SELECT first_name, last_name FROM actor WHERE actor_id = 1";
        let scores = component_accuracy(sql, sql);
        assert_eq!(scores.len(), 8);
        assert!(scores.values().all(|&s| s == 1.0));
    }

    #[test]
    fn partial_select_overlap_is_jaccard() {
        let scores = component_accuracy("SELECT first_name FROM actor", "SELECT first_name, last_name FROM actor");
        assert!((scores[&Clause::Select] - 0.5).abs() < 1e-12);
        assert_eq!(scores[&Clause::From], 1.0);
    }

    #[test]
    fn bucket_missing_from_truth_but_present_in_prediction_scores_zero() {
        let scores = component_accuracy("SELECT 1 FROM t", "SHOW TABLES");
        assert_eq!(scores[&Clause::Select], 0.0);
        assert_eq!(scores[&Clause::From], 0.0);
    }
}
