//! Constant-vector embedding provider for tests.

use crate::embeddings::provider::EmbeddingProvider;
use recall_core::AppResult;

const FAKE_VECTOR: [f32; 4] = [0.1, 0.2, 0.3, 0.4];

/// Returns the same 4-dimensional vector for every input text.
///
/// Every stored document therefore scores identically against every query,
/// which makes ranking fall back to insertion order.
#[derive(Debug, Default, Clone)]
pub struct FakeProvider;

impl FakeProvider {
    pub const DIMENSIONS: usize = FAKE_VECTOR.len();
    pub const MODEL: &'static str = "fake";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    fn model_name(&self) -> &str {
        Self::MODEL
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| FAKE_VECTOR.to_vec()).collect())
    }
}
