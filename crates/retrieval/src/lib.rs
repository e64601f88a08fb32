//! In-memory vector similarity search with an observable retriever.
//!
//! ```no_run
//! use recall_retrieval::{Document, FakeProvider, MemoryVectorStore, RetrieverConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> recall_core::AppResult<()> {
//! let store = Arc::new(MemoryVectorStore::new(Arc::new(FakeProvider::new())));
//! store
//!     .add_documents(vec![Document::new("Hello world").with_metadata("a", 1)])
//!     .await?;
//!
//! let retriever = store.as_retriever(RetrieverConfig::new(1)?);
//! let documents = retriever.get_relevant_documents("testing testing").await?;
//! assert_eq!(documents.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod embeddings;
pub mod retriever;
pub mod similarity;
pub mod store;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use document::Document;
pub use embeddings::{create_provider, EmbeddingProvider, FakeProvider, TrigramProvider};
pub use retriever::{
    CallbackObserver, RetrievalResult, Retriever, RetrieverConfig, RetrieverObserver,
    TracingObserver,
};
pub use store::{MemoryVectorStore, SearchFilters, VectorStore};
