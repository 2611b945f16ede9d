//! Text-to-SQL retrieval pipeline.
//!
//! The [`Text2SqlPipeline`] retrieves similar question/SQL examples and
//! relevant column descriptions for a question, renders them into a prompt
//! with [`PromptBuilder`], and asks a [`Completion`] backend for SQL.
//!
//! # Example
//!
//! ```rust,ignore
//! use t2s_rag::{LexicalIndex, RetrievalConfig, Text2SqlPipeline};
//!
//! let pipeline = Text2SqlPipeline::builder()
//!     .config(RetrievalConfig::default())
//!     .examples(Arc::new(LexicalIndex::load("q2sql_index.json")?))
//!     .fields(Arc::new(LexicalIndex::load("dbdesc_index.json")?))
//!     .completion(Arc::new(my_backend))
//!     .build()?;
//!
//! let sql = pipeline.generate_sql("显示所有演员的姓名")?;
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::completion::Completion;
use crate::config::RetrievalConfig;
use crate::corpus::{COLUMN_NAME, DESCRIPTION, QUESTION, SQL_TEXT, TABLE_NAME};
use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::prompt::{FieldMatch, PromptBuilder, SYSTEM_PROMPT, SimilarExample, clean_sql_response};
use crate::retriever::Retriever;

/// The Text-to-SQL pipeline orchestrator.
///
/// Construct one via [`Text2SqlPipeline::builder()`].
pub struct Text2SqlPipeline {
    config: RetrievalConfig,
    examples: Arc<dyn Retriever>,
    fields: Arc<dyn Retriever>,
    completion: Arc<dyn Completion>,
    prompt_builder: PromptBuilder,
}

impl Text2SqlPipeline {
    /// Create a new [`Text2SqlPipelineBuilder`].
    pub fn builder() -> Text2SqlPipelineBuilder {
        Text2SqlPipelineBuilder::default()
    }

    /// Return a reference to the retrieval configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve stored question/SQL pairs similar to `question`.
    ///
    /// Hits below the similarity threshold, or whose metadata lacks the
    /// question or SQL fields, are dropped.
    pub fn similar_examples(&self, question: &str) -> Vec<SimilarExample> {
        self.retrieve(self.examples.as_ref(), question, self.config.example_top_k)
            .into_iter()
            .filter_map(|hit| {
                let (Some(q), Some(sql)) = (hit.metadata.get(QUESTION), hit.metadata.get(SQL_TEXT)) else {
                    warn!(position = hit.position, "example hit is missing question or sql_text");
                    return None;
                };
                Some(SimilarExample { similarity: hit.similarity, question: q.clone(), sql: sql.clone() })
            })
            .collect()
    }

    /// Retrieve column descriptions relevant to `question`.
    ///
    /// Hits below the similarity threshold, or whose metadata lacks the table,
    /// column or description fields, are dropped.
    pub fn relevant_fields(&self, question: &str) -> Vec<FieldMatch> {
        self.retrieve(self.fields.as_ref(), question, self.config.field_top_k)
            .into_iter()
            .filter_map(|hit| {
                let meta = &hit.metadata;
                let (Some(table), Some(column), Some(description)) =
                    (meta.get(TABLE_NAME), meta.get(COLUMN_NAME), meta.get(DESCRIPTION))
                else {
                    warn!(position = hit.position, "field hit is missing table, column or description");
                    return None;
                };
                Some(FieldMatch {
                    similarity: hit.similarity,
                    table: table.clone(),
                    column: column.clone(),
                    description: description.clone(),
                })
            })
            .collect()
    }

    /// Retrieve context and render the generation prompt for `question`.
    pub fn build_prompt(&self, question: &str) -> String {
        let examples = self.similar_examples(question);
        let fields = self.relevant_fields(question);
        info!(examples = examples.len(), fields = fields.len(), "retrieved prompt context");
        self.prompt_builder.build(question, &fields, &examples)
    }

    /// Generate SQL for `question`: retrieve → prompt → complete → clean.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if the completion backend fails or
    /// returns no SQL.
    pub fn generate_sql(&self, question: &str) -> Result<String> {
        let prompt = self.build_prompt(question);

        let response = self.completion.complete(SYSTEM_PROMPT, &prompt).map_err(|e| {
            error!(backend = self.completion.name(), error = %e, "completion failed");
            RagError::PipelineError(format!("SQL generation failed: {e}"))
        })?;

        let sql = clean_sql_response(&response);
        if sql.is_empty() {
            error!(backend = self.completion.name(), "completion returned no SQL");
            return Err(RagError::PipelineError("completion returned no SQL".to_string()));
        }

        info!(backend = self.completion.name(), sql_len = sql.len(), "generated SQL");
        Ok(sql)
    }

    fn retrieve(&self, retriever: &dyn Retriever, question: &str, top_k: usize) -> Vec<SearchResult> {
        let threshold = self.config.similarity_threshold;
        let mut hits = retriever.search(question, top_k);
        hits.retain(|hit| hit.similarity >= threshold);
        hits
    }
}

/// Builder for constructing a [`Text2SqlPipeline`].
///
/// `examples`, `fields` and `completion` are required. The config defaults to
/// [`RetrievalConfig::default()`] and the schema to the Sakila summary.
#[derive(Default)]
pub struct Text2SqlPipelineBuilder {
    config: Option<RetrievalConfig>,
    examples: Option<Arc<dyn Retriever>>,
    fields: Option<Arc<dyn Retriever>>,
    completion: Option<Arc<dyn Completion>>,
    schema: Option<String>,
}

impl Text2SqlPipelineBuilder {
    /// Set the retrieval configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the retriever over question/SQL pairs.
    pub fn examples(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.examples = Some(retriever);
        self
    }

    /// Set the retriever over column descriptions.
    pub fn fields(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.fields = Some(retriever);
        self
    }

    /// Set the completion backend.
    pub fn completion(mut self, completion: Arc<dyn Completion>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Replace the schema text placed in every prompt.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Build the [`Text2SqlPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<Text2SqlPipeline> {
        let examples =
            self.examples.ok_or_else(|| RagError::ConfigError("examples retriever is required".to_string()))?;
        let fields =
            self.fields.ok_or_else(|| RagError::ConfigError("fields retriever is required".to_string()))?;
        let completion =
            self.completion.ok_or_else(|| RagError::ConfigError("completion is required".to_string()))?;

        Ok(Text2SqlPipeline {
            config: self.config.unwrap_or_default(),
            examples,
            fields,
            completion,
            prompt_builder: self.schema.map(PromptBuilder::new).unwrap_or_default(),
        })
    }
}
