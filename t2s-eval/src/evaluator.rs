//! Scoring of predicted SQL against ground truth.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{Connection, Connector, rows_equal};
use crate::error::{EvalError, Result};
use crate::normalize::{exact_match_score, token_level_accuracy};

/// A question with its predicted and reference SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalCase {
    pub question: String,
    pub predicted: String,
    pub ground_truth: String,
}

impl EvalCase {
    pub fn new(
        question: impl Into<String>,
        predicted: impl Into<String>,
        ground_truth: impl Into<String>,
    ) -> Self {
        Self { question: question.into(), predicted: predicted.into(), ground_truth: ground_truth.into() }
    }
}

/// One scored prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub predicted: String,
    pub ground_truth: String,
    /// `1.0` when the normalized statements are identical.
    pub exact_match: f64,
    /// Token sequence similarity in `[0, 1]`.
    pub token_accuracy: f64,
    /// `1.0` when both statements fetch identical rows.
    pub execution_accuracy: f64,
    pub execution_message: String,
}

/// Per-metric means over a batch, with the records they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_cases: usize,
    pub exact_match_accuracy: f64,
    pub token_level_accuracy: f64,
    pub execution_accuracy: f64,
    pub detailed_results: Vec<EvaluationRecord>,
}

impl BatchSummary {
    /// Aggregate records into a summary.
    ///
    /// Returns [`EvalError::EmptyBatch`] for an empty input.
    pub fn from_records(records: Vec<EvaluationRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(EvalError::EmptyBatch);
        }
        let n = records.len() as f64;
        let mean = |f: fn(&EvaluationRecord) -> f64| records.iter().map(f).sum::<f64>() / n;
        Ok(Self {
            total_cases: records.len(),
            exact_match_accuracy: mean(|r| r.exact_match),
            token_level_accuracy: mean(|r| r.token_accuracy),
            execution_accuracy: mean(|r| r.execution_accuracy),
            detailed_results: records,
        })
    }

    /// Write this summary as pretty-printed JSON into `writer`.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Write this summary, records included, as pretty-printed JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Io`] or [`EvalError::Serialization`] on failure.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), total_cases = self.total_cases, "saved evaluation results");
        Ok(())
    }
}

/// Scores predictions, optionally executing them through a [`Connector`].
#[derive(Default)]
pub struct Evaluator {
    connector: Option<Box<dyn Connector>>,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator").field("has_connection", &self.has_connection()).finish()
    }
}

impl Evaluator {
    /// An evaluator without a database; execution accuracy is always `0.0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator that executes statements through `connector`.
    pub fn with_connector(connector: impl Connector + 'static) -> Self {
        Self { connector: Some(Box::new(connector)) }
    }

    pub fn has_connection(&self) -> bool {
        self.connector.is_some()
    }

    /// Execute both statements on one connection and compare the fetched rows.
    ///
    /// Never fails: connection and execution errors become a `0.0` score
    /// with a message naming the failing side. The connection is closed on
    /// every path once opened.
    pub fn execution_accuracy(&self, predicted: &str, ground_truth: &str) -> (f64, String) {
        let Some(connector) = &self.connector else {
            return (0.0, "No database connection".to_string());
        };
        let mut conn = match connector.connect() {
            Ok(conn) => conn,
            Err(e) => return (0.0, format!("Database connection error: {e}")),
        };

        let outcome = compare_results(conn.as_mut(), predicted, ground_truth);
        if let Err(e) = conn.close() {
            warn!(error = %e, "failed to close database connection");
        }
        outcome
    }

    /// Score a single prediction on all three metrics.
    pub fn evaluate_single(&self, question: &str, predicted: &str, ground_truth: &str) -> EvaluationRecord {
        let (execution_accuracy, execution_message) = self.execution_accuracy(predicted, ground_truth);
        EvaluationRecord {
            question: question.to_string(),
            predicted: predicted.to_string(),
            ground_truth: ground_truth.to_string(),
            exact_match: exact_match_score(predicted, ground_truth),
            token_accuracy: token_level_accuracy(predicted, ground_truth),
            execution_accuracy,
            execution_message,
        }
    }

    /// Score every case in order and aggregate the results.
    pub fn evaluate_batch(&self, cases: &[EvalCase]) -> Result<BatchSummary> {
        if cases.is_empty() {
            return Err(EvalError::EmptyBatch);
        }

        let records: Vec<EvaluationRecord> = cases
            .iter()
            .map(|case| {
                let record = self.evaluate_single(&case.question, &case.predicted, &case.ground_truth);
                info!(
                    question = %preview(&case.question, 50),
                    exact_match = record.exact_match,
                    token_accuracy = record.token_accuracy,
                    execution_accuracy = record.execution_accuracy,
                    "evaluated case"
                );
                record
            })
            .collect();

        let summary = BatchSummary::from_records(records)?;
        info!(
            total_cases = summary.total_cases,
            exact_match_accuracy = summary.exact_match_accuracy,
            token_level_accuracy = summary.token_level_accuracy,
            execution_accuracy = summary.execution_accuracy,
            "batch evaluation complete"
        );
        Ok(summary)
    }
}

fn compare_results(conn: &mut dyn Connection, predicted: &str, ground_truth: &str) -> (f64, String) {
    let predicted_rows = match conn.fetch_all(predicted) {
        Ok(rows) => rows,
        Err(e) => return (0.0, format!("Predicted SQL execution error: {e}")),
    };
    let truth_rows = match conn.fetch_all(ground_truth) {
        Ok(rows) => rows,
        Err(e) => return (0.0, format!("Ground truth SQL execution error: {e}")),
    };
    if rows_equal(&predicted_rows, &truth_rows) {
        (1.0, "Results match".to_string())
    } else {
        (0.0, "Results differ".to_string())
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
