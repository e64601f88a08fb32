//! Configuration management for Recall.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - YAML config file (`RECALL_CONFIG`, or `recall.yaml` in the current directory)
//! - Environment variables
//! - Explicit overrides from the embedding application

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Embedding providers bundled with `recall-retrieval`.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["fake", "trigram"];

/// Model identifier each bundled provider serves, if `provider` is known.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "fake" => Some("fake"),
        "trigram" => Some("trigram-v1"),
        _ => None,
    }
}

/// Default config file name looked up in the current directory.
const DEFAULT_CONFIG_FILE: &str = "recall.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the values were merged from, if any
    pub config_file: Option<PathBuf>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Log line format
    pub log_format: LogFormat,

    /// Disable colored output
    pub no_color: bool,

    /// Retriever defaults
    pub retriever: RetrieverSettings,

    /// Embedding provider selection
    pub embedding: EmbeddingConfig,
}

/// Retriever settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieverSettings {
    /// Number of documents returned per query
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    4
}

impl Default for RetrieverSettings {
    fn default() -> Self {
        Self { k: default_k() }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "fake", "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl EmbeddingConfig {
    /// Switch provider, resetting the model to the provider's own when known.
    pub fn set_provider(&mut self, provider: impl Into<String>) {
        self.provider = provider.into();
        if let Some(model) = default_model(&self.provider) {
            self.model = model.to_string();
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    retriever: Option<RetrieverSettings>,
    embedding: Option<EmbeddingSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    format: Option<LogFormat>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            log_format: LogFormat::Pretty,
            no_color: false,
            retriever: RetrieverSettings::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment.
    ///
    /// Environment variables:
    /// - `RECALL_CONFIG`: Path to config file
    /// - `RECALL_K`: Number of documents per query
    /// - `RECALL_EMBEDDING_PROVIDER`: Embedding provider name
    /// - `RECALL_EMBEDDING_MODEL`: Embedding model identifier
    /// - `RECALL_EMBEDDING_DIMENSIONS`: Embedding dimensions
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use recall_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("k = {}", config.retriever.k);
    /// ```
    pub fn load() -> AppResult<Self> {
        let explicit = std::env::var("RECALL_CONFIG").ok().map(PathBuf::from);
        let mut config = Self::load_from(explicit.as_deref())?;

        if let Ok(k) = std::env::var("RECALL_K") {
            config.retriever.k = parse_env_number("RECALL_K", &k)?;
        }

        if let Ok(provider) = std::env::var("RECALL_EMBEDDING_PROVIDER") {
            config.embedding.set_provider(provider);
        }

        if let Ok(model) = std::env::var("RECALL_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if let Ok(dimensions) = std::env::var("RECALL_EMBEDDING_DIMENSIONS") {
            config.embedding.dimensions =
                parse_env_number("RECALL_EMBEDDING_DIMENSIONS", &dimensions)?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Load defaults merged with a YAML file, without consulting the environment.
    ///
    /// An explicit path must exist; without one, `recall.yaml` in the current
    /// directory is merged when present.
    pub fn load_from(config_file: Option<&Path>) -> AppResult<Self> {
        let config = Self::default();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config.merge_yaml(path)
            }
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    config.merge_yaml(&fallback)
                } else {
                    Ok(config)
                }
            }
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(retriever) = config_file.retriever {
            result.retriever = retriever;
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding.set_provider(provider);
            }
            if let Some(model) = embedding.model {
                result.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding.dimensions = dimensions;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply explicit overrides, taking precedence over file and environment.
    pub fn with_overrides(
        mut self,
        k: Option<usize>,
        embedding_provider: Option<String>,
        log_level: Option<String>,
        verbose: bool,
    ) -> Self {
        if let Some(k) = k {
            self.retriever.k = k;
        }

        if let Some(provider) = embedding_provider {
            self.embedding.set_provider(provider);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        // Verbose implies debug unless a level was given
        if verbose && self.log_level.is_none() {
            self.log_level = Some("debug".to_string());
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        if self.retriever.k == 0 {
            return Err(AppError::Config(
                "retriever.k must be a positive integer".to_string(),
            ));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if default_model(&self.embedding.provider) != Some(self.embedding.model.as_str()) {
            return Err(AppError::Config(format!(
                "Embedding provider '{}' does not serve model '{}'",
                self.embedding.provider, self.embedding.model
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be a positive integer".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env_number(name: &str, value: &str) -> AppResult<usize> {
    value.trim().parse::<usize>().map_err(|e| {
        AppError::Config(format!("Invalid value for {}: '{}' ({})", name, value, e))
    })
}
