//! Data types for indexed documents and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Free-form key-value fields attached to an indexed text.
pub type Metadata = HashMap<String, String>;

/// One unit of indexed text.
///
/// Documents have no identifier of their own; their identity is the position
/// at which they were added to a [`LexicalIndex`](crate::LexicalIndex).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The text that is vectorized.
    pub text: String,
    /// Key-value metadata returned alongside search hits.
    pub metadata: Metadata,
}

impl Document {
    /// Create a document from text and metadata.
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// A retrieved entry paired with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Cosine similarity in `[0, 1]` (higher is more relevant).
    pub similarity: f64,
    /// Insertion position of the matched document.
    pub position: usize,
    /// Metadata stored for the matched document.
    pub metadata: Metadata,
}
