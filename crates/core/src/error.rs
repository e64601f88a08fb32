//! Error types for the Recall retrieval library.
//!
//! This module defines a unified error enum covering the store, embedding,
//! observer and configuration failure modes.

use std::fmt;
use thiserror::Error;

/// Boxed error returned by caller-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which observer notification was running when a callback failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverPhase {
    Start,
    End,
}

impl fmt::Display for ObserverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserverPhase::Start => write!(f, "start"),
            ObserverPhase::End => write!(f, "end"),
        }
    }
}

/// Unified error type for Recall.
///
/// All fallible operations return `Result<T, AppError>`. Nothing is retried
/// and nothing is swallowed; callers decide what to do with a failure.
#[derive(Error, Debug)]
pub enum AppError {
    /// An embedding's length disagrees with the store's dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding provider failures
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// An observer callback failed during a retrieval run
    #[error("Observer '{observer}' failed on {phase}: {source}")]
    Observer {
        observer: String,
        phase: ObserverPhase,
        #[source]
        source: BoxError,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed inconsistent arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal store state could not be accessed
    #[error("Store error: {0}")]
    Store(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
