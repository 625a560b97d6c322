//! Error types for summarization.

use thiserror::Error;

/// Result type alias for summarization operations.
pub type Result<T> = std::result::Result<T, SummarizeError>;

/// Errors from the external completion call.
///
/// These are per-request and recoverable: a failed summarization never
/// invalidates the search hits it was asked to describe. "No model
/// configured" is not represented here; that is the feature-disabled state,
/// reported as an absent summary rather than an error.
#[derive(Error, Debug)]
pub enum SummarizeError {
    /// The completion API answered with a non-success status.
    #[error("completion API request failed: {0}")]
    ApiRequest(String),

    /// The completion API answered with an unusable body.
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
