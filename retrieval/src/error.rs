//! Error types for the retrieval pipeline.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval pipeline.
///
/// Catalog and embedding failures during startup abort initialization
/// entirely; `EmptyPrompt` and `InvalidTopK` are request-scoped and never
/// affect engine state or other requests.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Catalog loading error.
    #[error("catalog error: {0}")]
    Catalog(#[from] cinescout_catalog::CatalogError),

    /// Embedding, cache, or index error.
    #[error("embedding error: {0}")]
    Embedding(#[from] cinescout_embeddings::EmbeddingError),

    /// Summarization call failed.
    #[error("summarization error: {0}")]
    Summarize(#[from] cinescout_summarize::SummarizeError),

    /// The query prompt is blank after trimming.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// The requested result count is out of range.
    #[error("top_k must be between {min} and {max}, got {got}")]
    InvalidTopK { min: usize, max: usize, got: usize },
}
