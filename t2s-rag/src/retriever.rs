//! Retriever trait shared by lexical and embedding-backed indexes.

use crate::document::SearchResult;

/// A searchable store of documents.
///
/// [`LexicalIndex`](crate::LexicalIndex) is the built-in implementation. An
/// embedding model plus vector database can stand in behind the same trait
/// without changing the pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use t2s_rag::{LexicalIndex, Retriever};
///
/// let retriever: Arc<dyn Retriever> = Arc::new(index);
/// let hits = retriever.search("演员姓名", 3);
/// ```
pub trait Retriever: Send + Sync {
    /// Return up to `top_k` hits for `query`, ordered by descending similarity.
    fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult>;
}
