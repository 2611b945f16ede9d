//! Error types for the `t2s-rag` crate.

use thiserror::Error;

/// Errors that can occur in indexing, persistence and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// `add_documents` was given a different number of texts and metadata entries.
    #[error("Shape mismatch: {texts} texts but {metadata} metadata entries")]
    ShapeMismatch {
        /// Number of texts supplied.
        texts: usize,
        /// Number of metadata mappings supplied.
        metadata: usize,
    },

    /// The first corpus produced no terms after tokenization and stop word removal.
    #[error("Empty vocabulary: the corpus contains only stop words or no word tokens")]
    EmptyVocabulary,

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A persisted index could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted index was written by an incompatible format or is internally inconsistent.
    #[error("Incompatible index format: found {found}, expected {expected}")]
    IncompatibleFormat {
        /// What the blob contained.
        found: String,
        /// What this version of the crate can read.
        expected: String,
    },

    /// Reading or writing an index file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The language model backend failed to produce a completion.
    #[error("Completion error: {0}")]
    CompletionError(String),

    /// An error in the retrieval pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
