//! Observable retriever over a vector store.
//!
//! Each call to [`Retriever::get_relevant_documents`] is one run:
//! observers are told it started, the query is embedded, the store is
//! searched, and observers are told which documents came back. Observers
//! run one at a time in registration order.

pub mod observer;

pub use observer::{CallbackObserver, RetrieverObserver, TracingObserver};

use crate::document::Document;
use crate::embeddings::EmbeddingProvider;
use crate::store::{SearchFilters, VectorStore};
use recall_core::{AppError, AppResult, ObserverPhase, RetrieverSettings};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Retriever settings and registered observers.
#[derive(Clone)]
pub struct RetrieverConfig {
    k: usize,
    filters: SearchFilters,
    observers: Vec<Arc<dyn RetrieverObserver>>,
}

impl RetrieverConfig {
    /// Create a config returning `k` documents per query.
    pub fn new(k: usize) -> AppResult<Self> {
        if k == 0 {
            return Err(AppError::Config(
                "Retriever k must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            k,
            filters: SearchFilters::default(),
            observers: Vec::new(),
        })
    }

    /// Create a config from loaded application settings.
    pub fn from_settings(settings: &RetrieverSettings) -> AppResult<Self> {
        Self::new(settings.k)
    }

    /// Restrict results to documents matching `filters`.
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Register an observer; observers are notified in registration order.
    pub fn with_observer(mut self, observer: Arc<dyn RetrieverObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for RetrieverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.observers.iter().map(|o| o.name()).collect();
        f.debug_struct("RetrieverConfig")
            .field("k", &self.k)
            .field("filters", &self.filters)
            .field("observers", &names)
            .finish()
    }
}

/// Output of one retrieval run.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    /// Correlates the run's start and end notifications
    pub run_id: Uuid,

    /// Retrieved documents (sorted by relevance)
    pub documents: Vec<Document>,

    /// Relevance scores, parallel to `documents`
    pub scores: Vec<f32>,
}

/// Translates text queries into ranked documents.
///
/// Holds no per-call state: every call re-embeds the query and re-scans
/// the store.
pub struct Retriever {
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            embeddings,
            store,
            config,
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Retrieve the `k` documents most relevant to `query`.
    pub async fn get_relevant_documents(&self, query: &str) -> AppResult<Vec<Document>> {
        Ok(self.run(query).await?.documents)
    }

    /// Like [`Self::get_relevant_documents`], keeping similarity scores.
    ///
    /// Observers still receive documents only.
    pub async fn get_relevant_documents_with_scores(
        &self,
        query: &str,
    ) -> AppResult<Vec<(Document, f32)>> {
        let result = self.run(query).await?;
        Ok(result.documents.into_iter().zip(result.scores).collect())
    }

    /// Execute one full run and return its documents and scores.
    ///
    /// If the run fails after observers have been told it started, each of
    /// them that has not received `on_end` gets `on_abort` before the error
    /// is returned.
    #[tracing::instrument(skip(self), fields(k = self.config.k))]
    pub async fn run(&self, query: &str) -> AppResult<RetrievalResult> {
        let run_id = Uuid::new_v4();
        let observers = &self.config.observers;

        for (i, observer) in observers.iter().enumerate() {
            if let Err(source) = observer.on_start(run_id, query).await {
                let error = observer_error(observer.as_ref(), ObserverPhase::Start, source);
                return Err(self.abort(run_id, &observers[..i], error).await);
            }
        }

        let (documents, scores) = match self.search(query).await {
            Ok(ranked) => ranked,
            Err(error) => return Err(self.abort(run_id, observers, error).await),
        };

        tracing::debug!(
            %run_id,
            "Retrieved {} documents (top score: {:.3})",
            documents.len(),
            scores.first().copied().unwrap_or(0.0)
        );

        for (i, observer) in observers.iter().enumerate() {
            if let Err(source) = observer.on_end(run_id, &documents).await {
                let error = observer_error(observer.as_ref(), ObserverPhase::End, source);
                return Err(self.abort(run_id, &observers[i..], error).await);
            }
        }

        Ok(RetrievalResult {
            run_id,
            documents,
            scores,
        })
    }

    async fn search(&self, query: &str) -> AppResult<(Vec<Document>, Vec<f32>)> {
        let query_embedding = self.embeddings.embed(query).await?;
        let ranked = self.store.similarity_search_filtered(
            &query_embedding,
            self.config.k,
            &self.config.filters,
        )?;

        Ok(ranked.into_iter().unzip())
    }

    async fn abort(
        &self,
        run_id: Uuid,
        observers: &[Arc<dyn RetrieverObserver>],
        error: AppError,
    ) -> AppError {
        for observer in observers {
            observer.on_abort(run_id, &error).await;
        }
        error
    }
}

fn observer_error(
    observer: &dyn RetrieverObserver,
    phase: ObserverPhase,
    source: recall_core::BoxError,
) -> AppError {
    tracing::warn!("Observer '{}' failed on {}: {}", observer.name(), phase, source);
    AppError::Observer {
        observer: observer.name().to_string(),
        phase,
        source,
    }
}
