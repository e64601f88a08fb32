//! Embedding providers.
//!
//! Embedding models are external collaborators; this module defines the
//! interface the store and retriever consume plus two local providers.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{FakeProvider, TrigramProvider};
