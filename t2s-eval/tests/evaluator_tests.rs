//! Integration tests for batch evaluation, stratification and reporting.

use std::collections::BTreeMap;

use t2s_eval::{
    BenchmarkComparison, Clause, ClauseExtractor, Difficulty, ErrorAnalysis, EvalCase, EvalError, Evaluator, Metric,
    basic_cases, component_accuracy, component_accuracy_with, difficulty_breakdown, exact_match_score,
};

/// Predictions of a join-oriented model for the basic Sakila cases.
const JOIN_MODEL: [&str; 7] = [
    "SELECT first_name, last_name FROM actor",
    "SELECT COUNT(*) FROM film",
    "SELECT title FROM film WHERE rating = \"PG\"",
    "SELECT title FROM film JOIN film_actor ON film.film_id = film_actor.film_id JOIN actor ON film_actor.actor_id = actor.actor_id WHERE first_name = \"John\"",
    "SELECT category.name, COUNT(*) FROM category JOIN film_category ON category.category_id = film_category.category_id GROUP BY category.name",
    "SELECT film.title, COUNT(rental.rental_id) FROM film JOIN inventory ON film.film_id = inventory.film_id JOIN rental ON inventory.inventory_id = rental.inventory_id GROUP BY film.title ORDER BY COUNT(rental.rental_id) DESC LIMIT 5",
    "SELECT title FROM film WHERE film_id NOT IN (SELECT DISTINCT film_id FROM inventory JOIN rental ON inventory.inventory_id = rental.inventory_id)",
];

/// Predictions of a model that copies the reference for the first three
/// cases and answers everything else with a constant.
const LAZY_MODEL: [&str; 7] = [
    "select first_name, last_name from actor;",
    "SELECT COUNT(*) FROM film",
    "SELECT title FROM film WHERE rating = \"PG\"",
    "SELECT 1",
    "SELECT 1",
    "SELECT 1",
    "SELECT 1",
];

fn eval_cases(predictions: &[&str]) -> Vec<EvalCase> {
    basic_cases().iter().zip(predictions).map(|(case, predicted)| case.with_prediction(*predicted)).collect()
}

#[test]
fn exact_match_ignores_formatting() {
    assert_eq!(exact_match_score("SELECT a FROM b;", "select a from b"), 1.0);
}

#[test]
fn batch_means_over_three_records() {
    let cases = vec![
        EvalCase::new("all actors", "SELECT * FROM actor", "select * from actor"),
        EvalCase::new("all films", "SELECT * FROM film", "SELECT title FROM film"),
        EvalCase::new("count films", "SELECT COUNT(*) FROM film;", "SELECT COUNT(*) FROM film"),
    ];
    let summary = Evaluator::new().evaluate_batch(&cases).unwrap();

    assert_eq!(summary.total_cases, 3);
    assert!((summary.exact_match_accuracy - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(summary.execution_accuracy, 0.0);
    let questions: Vec<&str> = summary.detailed_results.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(questions, vec!["all actors", "all films", "count films"]);
}

#[test]
fn execution_without_connection() {
    let evaluator = Evaluator::new();
    for (predicted, truth) in [("SELECT 1", "SELECT 1"), ("garbage", ""), ("", "SELECT 2")] {
        assert_eq!(evaluator.execution_accuracy(predicted, truth), (0.0, "No database connection".to_string()));
    }
    let record = evaluator.evaluate_single("q", "SELECT 1", "SELECT 1");
    assert_eq!(record.execution_message, "No database connection");
}

#[test]
fn empty_batch_fails_loudly() {
    assert!(matches!(Evaluator::new().evaluate_batch(&[]), Err(EvalError::EmptyBatch)));
}

#[test]
fn difficulty_breakdown_by_label() {
    let cases = vec![
        EvalCase::new("q1", "SELECT a FROM t", "SELECT a FROM t"),
        EvalCase::new("q2", "SELECT b FROM t", "SELECT a FROM t"),
        EvalCase::new("q3", "SELECT c FROM t", "SELECT c FROM t"),
    ];
    let summary = Evaluator::new().evaluate_batch(&cases).unwrap();
    let breakdown = difficulty_breakdown(&summary.detailed_results, &["easy", "easy", "hard"]);

    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[&Difficulty::Easy].exact_match, 0.5);
    assert_eq!(breakdown[&Difficulty::Easy].count, 2);
    assert_eq!(breakdown[&Difficulty::Hard].exact_match, 1.0);
    assert_eq!(breakdown[&Difficulty::Hard].count, 1);
}

#[test]
fn sakila_benchmark_end_to_end() {
    let cases = basic_cases();
    let evaluator = Evaluator::new();
    let join = evaluator.evaluate_batch(&eval_cases(&JOIN_MODEL)).unwrap();
    let lazy = evaluator.evaluate_batch(&eval_cases(&LAZY_MODEL)).unwrap();

    assert_eq!(join.total_cases, 7);
    assert!((join.exact_match_accuracy - 3.0 / 7.0).abs() < 1e-12);
    assert!((lazy.exact_match_accuracy - 3.0 / 7.0).abs() < 1e-12);
    assert!(join.token_level_accuracy > lazy.token_level_accuracy);

    let labels: Vec<Difficulty> = cases.iter().map(|c| c.difficulty).collect();
    let breakdown = difficulty_breakdown(&join.detailed_results, &labels);
    assert_eq!(breakdown[&Difficulty::Easy].exact_match, 1.0);
    assert_eq!(breakdown[&Difficulty::Medium].count, 2);
    assert_eq!(breakdown[&Difficulty::Hard].exact_match, 0.0);

    let analysis = ErrorAnalysis::from_records(&join.detailed_results).unwrap();
    assert_eq!(analysis.exact_match_correct, 3);
    assert_eq!(analysis.execution_correct, 0);
    assert_eq!(analysis.token_accuracy_max, 1.0);

    let mut comparison = BenchmarkComparison::new();
    comparison.add_benchmark("Model 1 (Join-based)", join);
    comparison.add_benchmark("Model 2 (Lazy)", lazy);
    let leaders = comparison.compare().unwrap();
    let token_leader = leaders.iter().find(|l| l.metric == Metric::TokenLevelAccuracy).unwrap();
    assert_eq!(token_leader.model, "Model 1 (Join-based)");
    assert!(comparison.render_table().contains("Model 2 (Lazy)"));
}

#[test]
fn component_accuracy_on_join_prediction() {
    let cases = basic_cases();
    let scores = component_accuracy(JOIN_MODEL[3], &cases[3].ground_truth);
    // "f.title" vs "title", and "film f" vs "film"
    assert_eq!(scores[&Clause::Select], 0.0);
    assert_eq!(scores[&Clause::From], 0.0);
    assert_eq!(scores[&Clause::Where], 1.0);
}

/// Extractor that treats every whitespace token as a select item.
struct BagOfTokens;

impl ClauseExtractor for BagOfTokens {
    fn extract(&self, sql: &str) -> BTreeMap<Clause, Vec<String>> {
        BTreeMap::from([(Clause::Select, sql.split_whitespace().map(str::to_lowercase).collect())])
    }
}

#[test]
fn custom_extractor_plugs_in() {
    let scores = component_accuracy_with(&BagOfTokens, "SELECT a FROM t", "select a from u");
    // {select, a, from, t} vs {select, a, from, u}
    assert!((scores[&Clause::Select] - 3.0 / 5.0).abs() < 1e-12);
    assert_eq!(scores[&Clause::From], 1.0);
}
