//! Error analysis and model comparison over batch summaries.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EvalError, Result};
use crate::evaluator::{BatchSummary, EvaluationRecord};

/// An aggregate metric of a [`BatchSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ExactMatchAccuracy,
    TokenLevelAccuracy,
    ExecutionAccuracy,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::ExactMatchAccuracy, Metric::TokenLevelAccuracy, Metric::ExecutionAccuracy];

    /// Read this metric from a summary.
    pub fn value(&self, summary: &BatchSummary) -> f64 {
        match self {
            Metric::ExactMatchAccuracy => summary.exact_match_accuracy,
            Metric::TokenLevelAccuracy => summary.token_level_accuracy,
            Metric::ExecutionAccuracy => summary.execution_accuracy,
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::ExactMatchAccuracy => "Exact Match Accuracy",
            Metric::TokenLevelAccuracy => "Token Level Accuracy",
            Metric::ExecutionAccuracy => "Execution Accuracy",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Metric::ExactMatchAccuracy => "exact_match_accuracy",
            Metric::TokenLevelAccuracy => "token_level_accuracy",
            Metric::ExecutionAccuracy => "execution_accuracy",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| EvalError::UnknownMetric(s.to_string()))
    }
}

/// Correct-answer counts and token-accuracy spread over a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    pub total: usize,
    pub exact_match_correct: usize,
    pub execution_correct: usize,
    pub token_accuracy_mean: f64,
    pub token_accuracy_min: f64,
    pub token_accuracy_max: f64,
}

impl ErrorAnalysis {
    /// Analyze `records`. Fails with [`EvalError::EmptyBatch`] if there are none.
    pub fn from_records(records: &[EvaluationRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(EvalError::EmptyBatch);
        }
        let tokens = records.iter().map(|r| r.token_accuracy);
        Ok(Self {
            total: records.len(),
            exact_match_correct: records.iter().filter(|r| r.exact_match == 1.0).count(),
            execution_correct: records.iter().filter(|r| r.execution_accuracy == 1.0).count(),
            token_accuracy_mean: tokens.clone().sum::<f64>() / records.len() as f64,
            token_accuracy_min: tokens.clone().fold(f64::INFINITY, f64::min),
            token_accuracy_max: tokens.fold(f64::NEG_INFINITY, f64::max),
        })
    }

    pub fn exact_match_rate(&self) -> f64 {
        self.exact_match_correct as f64 / self.total as f64
    }

    pub fn execution_rate(&self) -> f64 {
        self.execution_correct as f64 / self.total as f64
    }
}

/// The best model for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLeader {
    pub metric: Metric,
    pub model: String,
    pub score: f64,
}

/// Named batch summaries of several models over the same cases.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkComparison {
    benchmarks: Vec<(String, BatchSummary)>,
}

impl BenchmarkComparison {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model's summary. Re-adding a name replaces its summary in place.
    pub fn add_benchmark(&mut self, name: impl Into<String>, summary: BatchSummary) {
        let name = name.into();
        match self.benchmarks.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = summary,
            None => self.benchmarks.push((name, summary)),
        }
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Model names in registration order.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.benchmarks.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&BatchSummary> {
        self.benchmarks.iter().find(|(existing, _)| existing == name).map(|(_, summary)| summary)
    }

    /// The highest-scoring model on `metric`; the earliest registered wins ties.
    pub fn best_by(&self, metric: Metric) -> Option<MetricLeader> {
        let mut best: Option<&(String, BatchSummary)> = None;
        for entry in &self.benchmarks {
            if best.is_none_or(|(_, current)| metric.value(&entry.1) > metric.value(current)) {
                best = Some(entry);
            }
        }
        best.map(|(model, summary)| MetricLeader { metric, model: model.clone(), score: metric.value(summary) })
    }

    /// Leaders for every metric. Needs at least two registered models.
    pub fn compare(&self) -> Result<Vec<MetricLeader>> {
        if self.benchmarks.len() < 2 {
            return Err(EvalError::InsufficientModels { found: self.benchmarks.len() });
        }
        Ok(Metric::ALL.into_iter().filter_map(|metric| self.best_by(metric)).collect())
    }

    /// Plain-text table with one row per metric and one column per model.
    pub fn render_table(&self) -> String {
        let width = 24;
        let header: String = std::iter::once("Metric")
            .chain(self.models())
            .map(|cell| format!("{cell:<width$}"))
            .collect();
        let rule = "-".repeat(width * (1 + self.benchmarks.len()));
        let rows = Metric::ALL.into_iter().map(|metric| {
            let scores: String =
                self.benchmarks.iter().map(|(_, summary)| format!("{:<width$.3}", metric.value(summary))).collect();
            format!("{:<width$}{scores}", metric.label())
        });

        let mut out = String::new();
        for line in [header, rule].into_iter().chain(rows) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// HTML report with one score table per model, in registration order.
    pub fn render_html(&self) -> String {
        let mut out = String::from(HTML_HEAD);
        for (name, summary) in &self.benchmarks {
            out.push_str(&format!("<h2>{}</h2>\n<table>\n<tr><th>Metric</th><th>Score</th></tr>\n", escape_html(name)));
            for metric in Metric::ALL {
                out.push_str(&format!(
                    "<tr><td class=\"metric\">{}</td><td class=\"score\">{:.3}</td></tr>\n",
                    metric.label(),
                    metric.value(summary)
                ));
            }
            out.push_str(&format!(
                "<tr><td class=\"metric\">Total Test Cases</td><td>{}</td></tr>\n</table>\n",
                summary.total_cases
            ));
        }
        out.push_str("</body>\n</html>\n");
        out
    }

    /// Write [`render_html`](Self::render_html) to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Io`] if the file cannot be written.
    pub fn write_report(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render_html())?;
        info!(path = %path.display(), models = self.benchmarks.len(), "wrote evaluation report");
        Ok(())
    }
}

const HTML_HEAD: &str = "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>Text2SQL Evaluation Report</title>
<style>
body { font-family: Arial, sans-serif; margin: 40px; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
th { background-color: #f2f2f2; }
.metric { font-weight: bold; color: #2c3e50; }
.score { color: #27ae60; font-weight: bold; }
</style>
</head>
<body>
<h1>Text2SQL Evaluation Report</h1>
";

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
