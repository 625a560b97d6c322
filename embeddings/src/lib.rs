//! # Embeddings
//!
//! This crate provides the embedding side of the cinescout retrieval
//! pipeline: a content-addressed on-disk cache for catalog embeddings, an
//! in-memory cosine-similarity index, and the encoder capability trait the
//! pipeline consumes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Embeddings System                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  TextEncoder ──► EmbeddingSet ──► SimilarityIndex               │
//! │       │               │                                         │
//! │       ▼               ▼                                         │
//! │  OpenAI-compatible  EmbeddingCache                              │
//! │  HTTP endpoint      (signature + encoder keyed)                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cache is keyed by the catalog's content signature and the encoder
//! identifier; vectors computed under a different catalog or encoder are
//! never served. Any unreadable or torn cache entry is a miss, never a
//! failure.

pub mod cache;
pub mod encoder;
pub mod error;
pub mod index;
pub mod set;
pub mod similarity;

pub use cache::{CatalogSignature, EmbeddingCache};
pub use encoder::{OpenAIEncoder, TextEncoder};
pub use error::{EmbeddingError, Result};
pub use index::{IndexEntry, ScoredEntry, SimilarityIndex};
pub use set::EmbeddingSet;
pub use similarity::{cosine_similarity, dot_product, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
