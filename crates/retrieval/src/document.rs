//! Document type stored in and returned by vector stores.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A unit of text plus arbitrary metadata.
///
/// Equality is structural over both content and metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Text content used for embedding
    pub page_content: String,

    /// Arbitrary metadata (e.g., source path, tags)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}
