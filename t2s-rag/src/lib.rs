//! Retrieval for Text-to-SQL generation.
//!
//! This crate provides:
//! - [`LexicalIndex`], a TF-IDF + cosine similarity index with versioned persistence
//! - [`TfidfVectorizer`], the fit-once vectorizer behind the index
//! - corpus flattening for DDL, column descriptions and question/SQL pairs
//! - prompt assembly and the [`Text2SqlPipeline`] that feeds a [`Completion`] backend

pub mod completion;
pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod index;
pub mod persistence;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
mod stopwords;
pub mod vectorizer;

pub use completion::Completion;
pub use config::{IndexConfig, IndexConfigBuilder, RetrievalConfig, RetrievalConfigBuilder};
pub use corpus::{QuestionSql, column_documents, ddl_documents, question_sql_documents};
pub use document::{Document, Metadata, SearchResult};
pub use error::{RagError, Result};
pub use index::{LexicalIndex, cosine_similarity};
pub use persistence::FORMAT_VERSION;
pub use pipeline::{Text2SqlPipeline, Text2SqlPipelineBuilder};
pub use prompt::{FieldMatch, PromptBuilder, SAKILA_SCHEMA, SYSTEM_PROMPT, SimilarExample, clean_sql_response};
pub use retriever::Retriever;
pub use vectorizer::{TfidfVectorizer, analyze};
