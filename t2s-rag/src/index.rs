//! In-memory lexical similarity index using TF-IDF vectors and cosine similarity.
//!
//! [`LexicalIndex`] keeps one dense vector and one metadata mapping per added
//! document, aligned by insertion position. The vocabulary is fitted once, on
//! the first non-empty batch passed to [`LexicalIndex::add_documents`]; later
//! batches are projected onto it and out-of-vocabulary terms are dropped.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::config::IndexConfig;
use crate::document::{Document, Metadata, SearchResult};
use crate::error::{RagError, Result};
use crate::retriever::Retriever;
use crate::vectorizer::TfidfVectorizer;

/// A lexical nearest-neighbour index over short texts.
///
/// Not synchronized: callers that share an index across threads must wrap it
/// in a lock or search an immutable snapshot.
///
/// # Example
///
/// ```rust,ignore
/// use t2s_rag::LexicalIndex;
///
/// let mut index = LexicalIndex::new();
/// index.add_documents(&["actor.first_name: 名字"], vec![metadata])?;
/// let hits = index.search("名字", 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalIndex {
    pub(crate) config: IndexConfig,
    pub(crate) vectorizer: Option<TfidfVectorizer>,
    pub(crate) vectors: Vec<Vec<f64>>,
    pub(crate) metadata: Vec<Metadata>,
}

impl LexicalIndex {
    /// Create an empty, unfitted index with the default [`IndexConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty, unfitted index that will fit with `config`.
    pub fn with_config(config: IndexConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Whether a vocabulary has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.vectorizer.is_some()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The fitted vectorizer, if any.
    pub fn vectorizer(&self) -> Option<&TfidfVectorizer> {
        self.vectorizer.as_ref()
    }

    /// The config used for fitting.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Stored metadata, in insertion order.
    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Stored vectors, in insertion order.
    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Add documents given as parallel `texts` and `metadata` sequences.
    ///
    /// The first non-empty call fits the vocabulary on `texts`. Every later
    /// call only projects onto that vocabulary, so terms unseen at fit time
    /// contribute zero weight. An empty batch on an unfitted index is a no-op.
    ///
    /// # Errors
    ///
    /// - [`RagError::ShapeMismatch`] if the two sequences differ in length
    /// - [`RagError::EmptyVocabulary`] if the fitting batch yields no terms
    ///
    /// The index is left unchanged on error.
    pub fn add_documents<S: AsRef<str>>(&mut self, texts: &[S], metadata: Vec<Metadata>) -> Result<()> {
        if texts.len() != metadata.len() {
            return Err(RagError::ShapeMismatch { texts: texts.len(), metadata: metadata.len() });
        }
        if texts.is_empty() {
            return Ok(());
        }

        let vectorizer = match self.vectorizer.take() {
            Some(vectorizer) => vectorizer,
            None => {
                let fitted = TfidfVectorizer::fit(texts, &self.config)?;
                info!(vocabulary_size = fitted.dimensions(), documents = texts.len(), "fitted vocabulary");
                fitted
            }
        };

        self.vectors.extend(texts.iter().map(|text| vectorizer.transform(text.as_ref())));
        self.metadata.extend(metadata);
        self.vectorizer = Some(vectorizer);

        info!(added = texts.len(), total = self.vectors.len(), "added documents to index");
        Ok(())
    }

    /// Add whole [`Document`]s.
    ///
    /// # Errors
    ///
    /// Same as [`add_documents`](Self::add_documents).
    pub fn add(&mut self, documents: Vec<Document>) -> Result<()> {
        let (texts, metadata): (Vec<String>, Vec<Metadata>) =
            documents.into_iter().map(|doc| (doc.text, doc.metadata)).unzip();
        self.add_documents(&texts, metadata)
    }

    /// Return the `top_k` stored entries most similar to `query`.
    ///
    /// Results are ordered by descending cosine similarity; equal scores keep
    /// insertion order. Fewer than `top_k` results are returned when the index
    /// holds fewer documents. An unfitted index, or `top_k == 0`, yields an
    /// empty result.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        let Some(vectorizer) = &self.vectorizer else {
            debug!("search on unfitted index");
            return Vec::new();
        };
        if top_k == 0 {
            return Vec::new();
        }

        let query_vector = vectorizer.transform(query);
        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, cosine_similarity(&query_vector, vector)))
            .collect();

        // sort_by is stable, which keeps insertion order among ties
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(position, similarity)| SearchResult {
                similarity,
                position,
                metadata: self.metadata[position].clone(),
            })
            .collect()
    }
}

impl Retriever for LexicalIndex {
    fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        LexicalIndex::search(self, query, top_k)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
