//! Vector store abstraction.
//!
//! A [`VectorStore`] ranks stored documents against a query embedding.
//! Any implementation can back a [`crate::Retriever`].

pub mod filter;
pub mod memory;

pub use filter::SearchFilters;
pub use memory::MemoryVectorStore;

use crate::document::Document;
use recall_core::AppResult;

/// Trait for vector store backends.
///
/// Implementations must return results ordered by descending similarity,
/// breaking ties by ascending insertion order, and must return an empty
/// list (not an error) when nothing is stored.
pub trait VectorStore: Send + Sync {
    /// Search for the top-k documents satisfying `filters`.
    fn similarity_search_filtered(
        &self,
        query_embedding: &[f32],
        k: usize,
        filters: &SearchFilters,
    ) -> AppResult<Vec<(Document, f32)>>;

    /// Search for the top-k most similar documents to the query embedding.
    fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> AppResult<Vec<(Document, f32)>> {
        self.similarity_search_filtered(query_embedding, k, &SearchFilters::default())
    }

    /// Number of stored documents.
    fn len(&self) -> AppResult<usize>;

    fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }
}
