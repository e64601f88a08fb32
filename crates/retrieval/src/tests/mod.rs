//! Crate-level retrieval scenarios.


use crate::document::Document;
use crate::embeddings::EmbeddingProvider;
use crate::store::{MemoryVectorStore, SearchFilters, VectorStore};
use recall_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared, ordered record of pipeline events.
pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Store wrapper recording every search into an event log.
pub(crate) struct RecordingStore {
    pub inner: Arc<MemoryVectorStore>,
    pub log: EventLog,
}

impl VectorStore for RecordingStore {
    fn similarity_search_filtered(
        &self,
        query_embedding: &[f32],
        k: usize,
        filters: &SearchFilters,
    ) -> AppResult<Vec<(Document, f32)>> {
        self.log.lock().unwrap().push("search".to_string());
        self.inner
            .similarity_search_filtered(query_embedding, k, filters)
    }

    fn len(&self) -> AppResult<usize> {
        self.inner.len()
    }
}

/// Provider wrapper counting embedding calls, optionally failing them.
#[derive(Debug)]
pub(crate) struct CountingProvider {
    pub inner: Arc<dyn EmbeddingProvider>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl CountingProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing(inner: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            fail: true,
            ..Self::new(inner)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingProvider {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Embedding("provider unavailable".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}

/// Provider replaying a fixed sequence of batch responses, ignoring the texts.
#[derive(Debug)]
pub(crate) struct ScriptedProvider {
    pub responses: Mutex<VecDeque<Vec<Vec<f32>>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Vec<Vec<f32>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn dimensions(&self) -> usize {
        0
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Embedding("script exhausted".to_string()))
    }
}
