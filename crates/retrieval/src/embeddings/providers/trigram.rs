//! Character-trigram hashing embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use crate::similarity::normalize;
use recall_core::AppResult;
use std::collections::{BTreeMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic, content-aware embeddings for offline use.
///
/// Each significant word contributes to one bucket per character trigram
/// and one bucket for the whole word; the result is scaled to unit length.
/// Texts without significant words embed to the zero vector.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
    stop_words: HashSet<&'static str>,
}

impl TrigramProvider {
    pub const MODEL: &'static str = "trigram-v1";

    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    fn bucket(&self, seed: u64, bytes: impl Iterator<Item = u8>) -> usize {
        let hash = bytes.fold(0u64, |acc, b| acc.wrapping_mul(seed).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let lower = text.to_lowercase();

        // BTreeMap keeps float accumulation order stable across runs
        let mut word_freq: BTreeMap<&str, u32> = BTreeMap::new();
        for word in lower
            .split_whitespace()
            .filter(|w| w.len() > 2 && !self.stop_words.contains(*w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let idx = self.bucket(37, trigram.bytes());
                embedding[idx] += (freq as f32).sqrt();
            }

            let idx = self.bucket(31, word.bytes());
            embedding[idx] += freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        Self::MODEL
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
