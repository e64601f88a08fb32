//! Filters applied to candidate entries before ranking.

use crate::document::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Constraints a stored document must satisfy to be ranked.
///
/// Filtering happens before top-k selection, so a filtered search still
/// returns up to `k` matching documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Metadata keys that must be present with exactly these values
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Minimum cosine similarity score (-1.0 to 1.0)
    pub min_score: Option<f32>,
}

impl SearchFilters {
    /// Create a new empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a metadata entry to equal `value`
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set minimum relevance score
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Check if any filters are set
    pub fn has_filters(&self) -> bool {
        !self.metadata.is_empty() || self.min_score.is_some()
    }

    /// Whether a document's metadata satisfies every constraint.
    pub fn matches_document(&self, document: &Document) -> bool {
        self.metadata
            .iter()
            .all(|(key, expected)| document.metadata.get(key) == Some(expected))
    }

    /// Whether a score clears the minimum, if one is set.
    pub fn accepts_score(&self, score: f32) -> bool {
        self.min_score.map_or(true, |min| score >= min)
    }
}
