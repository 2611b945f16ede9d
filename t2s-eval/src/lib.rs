//! # t2s-eval
//!
//! Scoring of predicted SQL against ground truth for Text-to-SQL systems.
//!
//! Each prediction gets three independent scores:
//!
//! - **exact match**: equality after whitespace, case and terminator normalization
//! - **token accuracy**: sequence similarity of the normalized tokens
//! - **execution accuracy**: equality of the rows both statements fetch from
//!   the same database, when a [`Connector`] is configured
//!
//! Batches aggregate into a [`BatchSummary`], which can be broken down by
//! [`Difficulty`], analyzed with [`ErrorAnalysis`], and compared across models
//! with [`BenchmarkComparison`], which also renders an HTML report.
//! Summaries and benchmark cases save as pretty-printed JSON.
//!
//! ## Quick start
//!
//! ```rust
//! use t2s_eval::{EvalCase, Evaluator};
//!
//! let evaluator = Evaluator::new();
//! let summary = evaluator
//!     .evaluate_batch(&[EvalCase::new("How many films?", "select count(*) from film;", "SELECT COUNT(*) FROM film")])
//!     .unwrap();
//! assert_eq!(summary.exact_match_accuracy, 1.0);
//! ```
//!
//! ## Feature flags
//!
//! - `sqlite` (default): [`SqliteConnector`] for read-only execution against a SQLite file

pub mod components;
pub mod db;
pub mod difficulty;
pub mod error;
pub mod evaluator;
pub mod normalize;
pub mod report;
pub mod sakila;
pub mod sequence;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use components::{Clause, ClauseExtractor, HeuristicClauseExtractor, component_accuracy, component_accuracy_with};
pub use db::{Connection, Connector, Row, SqlValue, rows_equal};
pub use difficulty::{Difficulty, DifficultyStats, difficulty_breakdown};
pub use error::{DbError, EvalError, Result};
pub use evaluator::{BatchSummary, EvalCase, EvaluationRecord, Evaluator};
pub use normalize::{exact_match_score, normalize_sql, token_level_accuracy};
pub use report::{BenchmarkComparison, ErrorAnalysis, Metric, MetricLeader};
pub use sakila::{BenchmarkCase, basic_cases, load_cases, save_cases};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnector;
