//! Error types for catalog loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while loading the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The dataset path does not resolve to a file.
    #[error("dataset not found: {0}")]
    NotFound(PathBuf),

    /// The dataset is missing required columns or a row is unusable.
    #[error("dataset malformed: {0}")]
    Malformed(String),

    /// CSV parsing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
