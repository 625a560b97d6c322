//! Row-aligned embedding sets.

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// An ordered block of embeddings, one per catalog row, all sharing the same
/// dimension.
///
/// The set is created once (by the encoder on a cache miss, or by the cache
/// on a hit) and read-only afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSet {
    dimension: usize,
    vectors: Vec<Embedding>,
}

impl EmbeddingSet {
    /// Build a set from per-row vectors, enforcing a constant nonzero
    /// dimension across all of them.
    pub fn new(vectors: Vec<Embedding>) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(EmbeddingError::EmptyCatalog);
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(EmbeddingError::InvalidResponse(
                "zero-dimension embedding".to_string(),
            ));
        }
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }

        Ok(Self { dimension, vectors })
    }

    /// Dimension shared by every vector in the set.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors (equals the catalog row count).
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the set holds no vectors. Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The vectors in row order.
    pub fn vectors(&self) -> &[Embedding] {
        &self.vectors
    }

    /// Consume the set, yielding the vectors in row order.
    pub fn into_vectors(self) -> Vec<Embedding> {
        self.vectors
    }

    /// Flatten into the little-endian f32 blob layout used by the on-disk
    /// cache.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.vectors.len() * self.dimension * 4);
        for vector in &self.vectors {
            for value in vector {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        bytes
    }

    /// Reconstruct a set from the blob layout written by
    /// [`EmbeddingSet::to_bytes`].
    pub(crate) fn from_bytes(bytes: &[u8], dimension: usize, count: usize) -> Result<Self> {
        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| EmbeddingError::CacheCorrupt("vector blob size overflow".to_string()))?;
        if bytes.len() != expected {
            return Err(EmbeddingError::CacheCorrupt(format!(
                "vector blob holds {} bytes, expected {expected}",
                bytes.len()
            )));
        }

        let mut values = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        let vectors: Vec<Embedding> = (0..count)
            .map(|_| values.by_ref().take(dimension).collect())
            .collect();

        Self::new(vectors)
    }
}
