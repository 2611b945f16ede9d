//! Error types for the `t2s-eval` crate.

use thiserror::Error;

/// Errors raised by a database backend.
///
/// These never escape execution scoring; they are turned into the message
/// half of an execution-accuracy result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DbError {
    /// Opening the connection failed.
    #[error("{0}")]
    Connection(String),

    /// A statement could not be prepared, executed or fetched.
    #[error("{0}")]
    Execution(String),
}

/// Errors that can occur in evaluation and reporting.
#[derive(Debug, Error)]
pub enum EvalError {
    /// An aggregate was requested over zero records.
    #[error("Cannot aggregate an empty batch")]
    EmptyBatch,

    /// A model comparison needs at least two benchmarks.
    #[error("Model comparison needs at least two models, found {found}")]
    InsufficientModels {
        /// Number of registered benchmarks.
        found: usize,
    },

    /// A metric name could not be parsed.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// A database backend error surfaced outside of scoring.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Reading or writing a report or results file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A convenience result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;
