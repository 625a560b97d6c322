//! Configuration for the retrieval pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use cinescout_summarize::SummarizerConfig;

/// Configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Path to the catalog table.
    pub dataset_path: PathBuf,

    /// Directory holding the persisted embedding cache.
    pub cache_dir: PathBuf,

    /// Collection name, used as the cache artifact prefix.
    pub collection: String,

    /// Column holding the unique display title.
    pub title_field: String,

    /// Query processing configuration.
    pub query: QueryConfig,

    /// Summarization configuration.
    pub summarize: SummarizerConfig,
}

impl RetrievalConfig {
    /// Create a configuration for the given dataset with default values.
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            cache_dir: PathBuf::from(".cache"),
            collection: "top_movies".to_string(),
            title_field: "title".to_string(),
            query: QueryConfig::default(),
            summarize: SummarizerConfig::default(),
        }
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the collection name.
    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collection = name.into();
        self
    }

    /// Set the title column.
    pub fn with_title_field(mut self, field: impl Into<String>) -> Self {
        self.title_field = field.into();
        self
    }

    /// Set the summarization configuration.
    pub fn with_summarizer(mut self, config: SummarizerConfig) -> Self {
        self.summarize = config;
        self
    }
}

/// Configuration for query processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Upper bound accepted for a request's `top_k`.
    pub max_top_k: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_top_k: 20 }
    }
}
