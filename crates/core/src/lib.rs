//! Recall Core Library
//!
//! Foundational utilities shared by the Recall crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingConfig, RetrieverSettings};
pub use error::{AppError, AppResult, BoxError, ObserverPhase};
pub use logging::LogFormat;
