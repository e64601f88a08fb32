//! Embedding provider trait and factory.

use recall_core::{AppError, AppResult, EmbeddingConfig};
use std::sync::Arc;

use super::providers::{fake::FakeProvider, trigram::TrigramProvider};

/// Trait for embedding providers.
///
/// Implementations map text to fixed-length vectors. Failures are reported
/// as [`AppError::Embedding`] and are never retried by the caller.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "fake", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
///
/// The configured model must be the one the provider serves.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "fake" => {
            check_model(config, FakeProvider::MODEL)?;
            if config.dimensions != FakeProvider::DIMENSIONS {
                return Err(AppError::Config(format!(
                    "The fake embedding provider produces {} dimensions, configured {}",
                    FakeProvider::DIMENSIONS,
                    config.dimensions
                )));
            }
            Ok(Arc::new(FakeProvider::new()))
        }

        "trigram" => {
            check_model(config, TrigramProvider::MODEL)?;
            if config.dimensions == 0 {
                return Err(AppError::Config(
                    "Trigram provider requires at least one dimension".to_string(),
                ));
            }
            Ok(Arc::new(TrigramProvider::new(config.dimensions)))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: {}",
            config.provider,
            recall_core::config::KNOWN_EMBEDDING_PROVIDERS.join(", ")
        ))),
    }
}

fn check_model(config: &EmbeddingConfig, model: &str) -> AppResult<()> {
    if config.model != model {
        return Err(AppError::Config(format!(
            "Embedding provider '{}' serves model '{}', configured '{}'",
            config.provider, model, config.model
        )));
    }
    Ok(())
}
