//! Configuration for the lexical index and the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Vectorizer parameters fixed at fit time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexConfig {
    /// Upper bound on the vocabulary size.
    pub max_features: usize,
    /// Smallest and largest n-gram length, inclusive.
    pub ngram_range: (usize, usize),
    /// Whether English stop words are dropped before building n-grams.
    pub stop_words: bool,
    /// Whether text is lowercased before tokenization.
    pub lowercase: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { max_features: 512, ngram_range: (1, 2), stop_words: true, lowercase: true }
    }
}

impl IndexConfig {
    /// Create a new builder for constructing an [`IndexConfig`].
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(RagError::ConfigError("max_features must be greater than zero".to_string()));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(RagError::ConfigError(format!(
                "ngram_range ({min_n}, {max_n}) must satisfy 1 <= min <= max"
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`IndexConfig`].
#[derive(Debug, Clone, Default)]
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    /// Set the maximum number of vocabulary terms kept at fit time.
    pub fn max_features(mut self, max_features: usize) -> Self {
        self.config.max_features = max_features;
        self
    }

    /// Set the inclusive n-gram range.
    pub fn ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.config.ngram_range = (min_n, max_n);
        self
    }

    /// Enable or disable English stop word removal.
    pub fn stop_words(mut self, enabled: bool) -> Self {
        self.config.stop_words = enabled;
        self
    }

    /// Enable or disable lowercasing.
    pub fn lowercase(mut self, enabled: bool) -> Self {
        self.config.lowercase = enabled;
        self
    }

    /// Build the [`IndexConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `max_features == 0`
    /// - the n-gram range is empty or starts at zero
    pub fn build(self) -> Result<IndexConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parameters for the retrieval side of the Text-to-SQL pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of similar question/SQL examples placed in the prompt.
    pub example_top_k: usize,
    /// Number of schema field descriptions placed in the prompt.
    pub field_top_k: usize,
    /// Minimum similarity for a hit to be kept.
    pub similarity_threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { example_top_k: 3, field_top_k: 5, similarity_threshold: 0.0 }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set how many similar examples are retrieved.
    pub fn example_top_k(mut self, k: usize) -> Self {
        self.config.example_top_k = k;
        self
    }

    /// Set how many field descriptions are retrieved.
    pub fn field_top_k(mut self, k: usize) -> Self {
        self.config.field_top_k = k;
        self
    }

    /// Set the minimum similarity threshold for filtering hits.
    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Build the [`RetrievalConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if either `top_k` is zero or the
    /// threshold is not a finite number.
    pub fn build(self) -> Result<RetrievalConfig> {
        if self.config.example_top_k == 0 || self.config.field_top_k == 0 {
            return Err(RagError::ConfigError("top_k values must be greater than zero".to_string()));
        }
        if !self.config.similarity_threshold.is_finite() {
            return Err(RagError::ConfigError("similarity_threshold must be finite".to_string()));
        }
        Ok(self.config)
    }
}
