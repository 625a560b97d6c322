//! # Retrieval
//!
//! The retrieval pipeline ties the cinescout pieces together:
//!
//! - **Catalog**: the fixed item table being searched
//! - **Embeddings**: content-addressed vector cache and similarity index
//! - **Summarize**: optional synopsis over the ranked hits
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Retrieval Engine                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │   Catalog    │  │  Embedding   │  │    Text      │          │
//! │  │   Loader     │  │    Cache     │  │   Encoder    │          │
//! │  └──────────────┘  └──────────────┘  └──────────────┘          │
//! │         │                │                  │                   │
//! │         └────────────────┼──────────────────┘                   │
//! │                          ▼                                      │
//! │                  ┌──────────────┐       ┌──────────────┐        │
//! │                  │  Similarity  │  ───► │  Summarize   │        │
//! │                  │    Index     │       │  (optional)  │        │
//! │                  └──────────────┘       └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup is a one-time blocking sequence inside the engine constructor
//! (load → embed-or-cache-hit → rebuild); afterwards the engine is
//! read-mostly and `search` may be called concurrently.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use cinescout_embeddings::OpenAIEncoder;
//! use cinescout_retrieval::{RetrievalConfig, RetrievalEngine};
//!
//! let config = RetrievalConfig::new("movies_dataset.csv");
//! let engine = RetrievalEngine::new(config, Arc::new(OpenAIEncoder::new())).await?;
//!
//! let hits = engine.search("slow-burn heist thriller", 3).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;

pub use config::{QueryConfig, RetrievalConfig};
pub use engine::{RetrievalEngine, SearchHit, SearchOutcome, SummaryOutcome};
pub use error::{Result, RetrievalError};
pub use protocol::{SearchRequest, SearchResponse, SearchResult};

// Re-export from dependencies for convenience
pub use cinescout_catalog::{Catalog, CatalogRecord};
pub use cinescout_embeddings::{OpenAIEncoder, SimilarityIndex, TextEncoder};
pub use cinescout_summarize::{Summarizer, SummarizerConfig};
