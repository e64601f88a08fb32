//! Retrieval lifecycle observers.
//!
//! Observers are notified when a retrieval run starts and when it has
//! produced its documents. A run that fails after an observer's start
//! notification instead reaches that observer through `on_abort`. All
//! notifications are optional; the default implementations do nothing.

use crate::document::Document;
use recall_core::{AppError, AppResult, BoxError};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use uuid::Uuid;

/// Callbacks invoked around each retrieval run.
///
/// A returned error aborts the run with [`recall_core::AppError::Observer`].
#[async_trait::async_trait]
pub trait RetrieverObserver: Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called before the query is embedded.
    async fn on_start(&self, _run_id: Uuid, _query: &str) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called with the ranked documents before they are returned.
    async fn on_end(&self, _run_id: Uuid, _documents: &[Document]) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called instead of `on_end` when a run this observer saw start fails.
    ///
    /// Cannot fail; the run's own error is what the caller receives.
    async fn on_abort(&self, _run_id: Uuid, _error: &AppError) {}
}

/// Callback for run start.
pub type StartCallback = Arc<dyn Fn(Uuid, &str) -> Result<(), BoxError> + Send + Sync>;

/// Callback for run end.
pub type EndCallback = Arc<dyn Fn(Uuid, &[Document]) -> Result<(), BoxError> + Send + Sync>;

/// Callback for an aborted run.
pub type AbortCallback = Arc<dyn Fn(Uuid, &AppError) + Send + Sync>;

/// Observer built from closures; any callback may be left unset.
#[derive(Clone)]
pub struct CallbackObserver {
    name: String,
    start: Option<StartCallback>,
    end: Option<EndCallback>,
    abort: Option<AbortCallback>,
}

impl CallbackObserver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: None,
            end: None,
            abort: None,
        }
    }

    /// Set the start callback.
    pub fn with_start<F>(mut self, callback: F) -> Self
    where
        F: Fn(Uuid, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.start = Some(Arc::new(callback));
        self
    }

    /// Set the end callback.
    pub fn with_end<F>(mut self, callback: F) -> Self
    where
        F: Fn(Uuid, &[Document]) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.end = Some(Arc::new(callback));
        self
    }

    /// Set the abort callback.
    pub fn with_abort<F>(mut self, callback: F) -> Self
    where
        F: Fn(Uuid, &AppError) + Send + Sync + 'static,
    {
        self.abort = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for CallbackObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackObserver")
            .field("name", &self.name)
            .field("start", &self.start.is_some())
            .field("end", &self.end.is_some())
            .field("abort", &self.abort.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl RetrieverObserver for CallbackObserver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_start(&self, run_id: Uuid, query: &str) -> Result<(), BoxError> {
        match &self.start {
            Some(callback) => callback(run_id, query),
            None => Ok(()),
        }
    }

    async fn on_end(&self, run_id: Uuid, documents: &[Document]) -> Result<(), BoxError> {
        match &self.end {
            Some(callback) => callback(run_id, documents),
            None => Ok(()),
        }
    }

    async fn on_abort(&self, run_id: Uuid, error: &AppError) {
        if let Some(callback) = &self.abort {
            callback(run_id, error);
        }
    }
}

/// Logs each run through `tracing`, including elapsed time.
#[derive(Debug, Default)]
pub struct TracingObserver {
    started: Mutex<HashMap<Uuid, Instant>>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs that have started but neither ended nor aborted.
    pub fn in_flight(&self) -> AppResult<usize> {
        self.started
            .lock()
            .map(|started| started.len())
            .map_err(|_| AppError::Store("Tracing observer lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl RetrieverObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn on_start(&self, run_id: Uuid, query: &str) -> Result<(), BoxError> {
        self.started
            .lock()
            .map_err(|e| e.to_string())?
            .insert(run_id, Instant::now());

        tracing::debug!(%run_id, query, "Retriever run started");
        Ok(())
    }

    async fn on_end(&self, run_id: Uuid, documents: &[Document]) -> Result<(), BoxError> {
        let started = self
            .started
            .lock()
            .map_err(|e| e.to_string())?
            .remove(&run_id);

        tracing::debug!(
            %run_id,
            documents = documents.len(),
            elapsed_ms = started.map(|s| s.elapsed().as_secs_f64() * 1000.0),
            "Retriever run finished"
        );
        Ok(())
    }

    async fn on_abort(&self, run_id: Uuid, error: &AppError) {
        let started = match self.started.lock() {
            Ok(mut started) => started.remove(&run_id),
            Err(poisoned) => poisoned.into_inner().remove(&run_id),
        };

        tracing::debug!(
            %run_id,
            error = %error,
            elapsed_ms = started.map(|s| s.elapsed().as_secs_f64() * 1000.0),
            "Retriever run aborted"
        );
    }
}
