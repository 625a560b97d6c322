//! Similarity index over the catalog embeddings.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::{dot_product, normalize};

/// An entry in the similarity index: one catalog row, its embedding, and the
/// full record as an opaque payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Original catalog row position, used as the item identifier.
    pub row: usize,

    /// The embedding vector. Normalized to unit length at rebuild.
    pub embedding: Embedding,

    /// The full item record.
    pub payload: serde_json::Value,
}

/// A search match: row, cosine score, and the item payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEntry {
    /// Original catalog row of the matched item.
    pub row: usize,

    /// Cosine similarity to the query, in [-1, 1].
    pub score: f32,

    /// The matched item's record.
    pub payload: serde_json::Value,
}

/// In-memory cosine-similarity index.
///
/// The index holds one vector per catalog item and supports two operations:
/// a wholesale [`SimilarityIndex::rebuild`] and a top-k
/// [`SimilarityIndex::search`]. There is no incremental insert or delete;
/// any catalog change requires a full rebuild.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl SimilarityIndex {
    /// Create an empty index. Unusable until the first rebuild.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimension of the indexed vectors. Zero before the first rebuild.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Replace the entire index content.
    ///
    /// Entries are normalized to unit length and swapped in wholesale, so a
    /// caller observes either the fully old or fully new index, never a
    /// partial mix. Fails with [`EmbeddingError::EmptyCatalog`] when
    /// `entries` is empty and [`EmbeddingError::DimensionMismatch`] when the
    /// entries disagree on dimension; the existing content is untouched on
    /// failure.
    pub fn rebuild(&mut self, mut entries: Vec<IndexEntry>) -> Result<()> {
        let Some(first) = entries.first() else {
            return Err(EmbeddingError::EmptyCatalog);
        };
        let dimension = first.embedding.len();
        for entry in &entries {
            if entry.embedding.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: entry.embedding.len(),
                });
            }
        }

        for entry in &mut entries {
            normalize(&mut entry.embedding);
        }

        self.entries = entries;
        self.dimension = dimension;
        info!("rebuilt similarity index: {} entries, {dimension}-dim", self.len());
        Ok(())
    }

    /// Return the `k` entries most similar to `query`, descending by cosine
    /// score with ties broken by ascending row.
    ///
    /// `k` larger than the index is clamped, never an error. Fails with
    /// [`EmbeddingError::DimensionMismatch`] when the query dimension
    /// differs from the indexed vectors, and [`EmbeddingError::EmptyCatalog`]
    /// when called before any rebuild.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<ScoredEntry>> {
        if self.entries.is_empty() {
            return Err(EmbeddingError::EmptyCatalog);
        }
        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut query = query.clone();
        normalize(&mut query);

        // Stored vectors are unit length, so cosine reduces to a dot product.
        let mut scores = Vec::with_capacity(self.entries.len());
        for (position, entry) in self.entries.iter().enumerate() {
            let score = dot_product(&query, &entry.embedding)?;
            scores.push((OrderedFloat(score), entry.row, position));
        }
        scores.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let results = scores
            .into_iter()
            .take(k)
            .map(|(score, row, position)| ScoredEntry {
                row,
                score: score.0,
                payload: self.entries[position].payload.clone(),
            })
            .collect();

        debug!("search returned up to {k} of {} entries", self.len());
        Ok(results)
    }
}
