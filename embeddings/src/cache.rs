//! Content-addressed cache for catalog embeddings.
//!
//! Embedding the whole catalog is the dominant one-time cost, so vectors are
//! persisted across process restarts. An entry is valid only when both the
//! catalog's content signature and the encoder identifier match the current
//! configuration. Anything else, including a torn or truncated write, is a
//! miss that triggers recompute, never a failure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{EmbeddingError, Result};
use crate::set::EmbeddingSet;

/// Content digest of the raw catalog bytes.
///
/// Identical bytes always produce the same signature; any byte difference
/// changes it, so formatting-only edits to the source still force
/// re-embedding. Used solely as a cache-validity key, never as an item
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSignature(String);

impl CatalogSignature {
    /// Digest the exact bytes read from the catalog source.
    pub fn compute(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Hex form of the digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CatalogSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata record persisted alongside the vector blob.
///
/// `catalog_signature` and `encoder_id` are the sole validity keys on load;
/// `dimension` and `count` describe the blob layout and `vectors_sha256`
/// detects a blob that does not belong to this metadata.
#[derive(Debug, Serialize, Deserialize)]
struct CacheMetadata {
    catalog_signature: CatalogSignature,
    encoder_id: String,
    dimension: usize,
    count: usize,
    vectors_sha256: String,
}

/// On-disk embedding cache, keyed by `(collection, encoder identifier)`.
///
/// Each key maps to two companion artifacts in the cache directory: a JSON
/// metadata record and a little-endian f32 vector blob. Writers publish the
/// blob first and the metadata last, each through a temp-file rename, so a
/// concurrent reader never validates a half-written entry.
pub struct EmbeddingCache {
    dir: PathBuf,
    collection: String,
}

impl EmbeddingCache {
    /// Create a cache rooted at `dir` for the named collection.
    pub fn new(dir: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            collection: collection.into(),
        }
    }

    /// Load the stored embeddings for this catalog and encoder, or `None`.
    ///
    /// A hit requires the stored signature AND encoder identifier to match
    /// exactly; the dimension is informational. Unreadable entries are
    /// logged and reported as misses.
    pub async fn load(
        &self,
        signature: &CatalogSignature,
        encoder_id: &str,
    ) -> Option<EmbeddingSet> {
        match self.read_entry(signature, encoder_id).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("ignoring unreadable cache entry for encoder {encoder_id}: {e}");
                None
            }
        }
    }

    /// Persist embeddings for this catalog and encoder, replacing any prior
    /// entry under the same key.
    pub async fn store(
        &self,
        signature: &CatalogSignature,
        encoder_id: &str,
        set: &EmbeddingSet,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let (metadata_path, vectors_path) = self.entry_paths(encoder_id);
        let blob = set.to_bytes();
        let metadata = CacheMetadata {
            catalog_signature: signature.clone(),
            encoder_id: encoder_id.to_string(),
            dimension: set.dimension(),
            count: set.len(),
            vectors_sha256: hex::encode(Sha256::digest(&blob)),
        };

        // Blob first, metadata last: the metadata is the validity gate, so
        // it must never point at vectors that are not fully on disk.
        write_atomic(&vectors_path, &blob).await?;
        write_atomic(&metadata_path, serde_json::to_string_pretty(&metadata)?.as_bytes()).await?;

        info!(
            "stored {} embeddings ({}-dim) for encoder {encoder_id}",
            set.len(),
            set.dimension()
        );
        Ok(())
    }

    async fn read_entry(
        &self,
        signature: &CatalogSignature,
        encoder_id: &str,
    ) -> Result<Option<EmbeddingSet>> {
        let (metadata_path, vectors_path) = self.entry_paths(encoder_id);
        if !metadata_path.exists() || !vectors_path.exists() {
            debug!("no cache entry for encoder {encoder_id}");
            return Ok(None);
        }

        let metadata: CacheMetadata =
            serde_json::from_str(&fs::read_to_string(&metadata_path).await?)?;
        if metadata.catalog_signature != *signature {
            debug!("cache signature mismatch for encoder {encoder_id}, catalog changed");
            return Ok(None);
        }
        if metadata.encoder_id != encoder_id {
            debug!("cache encoder mismatch: stored {}", metadata.encoder_id);
            return Ok(None);
        }

        let blob = fs::read(&vectors_path).await?;
        if hex::encode(Sha256::digest(&blob)) != metadata.vectors_sha256 {
            return Err(EmbeddingError::CacheCorrupt(
                "vector blob checksum mismatch".to_string(),
            ));
        }

        let set = EmbeddingSet::from_bytes(&blob, metadata.dimension, metadata.count)?;
        debug!("cache hit: {} embeddings for encoder {encoder_id}", set.len());
        Ok(Some(set))
    }

    /// Paths of the metadata and vector artifacts for an encoder.
    fn entry_paths(&self, encoder_id: &str) -> (PathBuf, PathBuf) {
        let stem = format!("{}_{}", self.collection, encoder_id.replace('/', "_"));
        (
            self.dir.join(format!("{stem}.json")),
            self.dir.join(format!("{stem}.vectors")),
        )
    }
}

/// Write `contents` to `path` through a temp file and atomic rename.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let temp_path = path.with_extension(format!("{extension}.tmp"));
    fs::write(&temp_path, contents).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_set() -> EmbeddingSet {
        EmbeddingSet::new(vec![vec![1.0, 0.0], vec![0.5, 0.5]]).unwrap()
    }

    #[test]
    fn test_signature_deterministic() {
        let bytes = b"title,genre\nA,x\n";
        assert_eq!(
            CatalogSignature::compute(bytes),
            CatalogSignature::compute(bytes)
        );
    }

    #[test]
    fn test_signature_changes_with_any_byte() {
        let a = CatalogSignature::compute(b"title,genre\nA,x\n");
        let b = CatalogSignature::compute(b"title,genre\nA,x \n");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_store_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = EmbeddingCache::new(dir.path(), "catalog");
        let signature = CatalogSignature::compute(b"rows");
        let set = sample_set();

        cache.store(&signature, "encoder-a", &set).await.unwrap();
        let loaded = cache.load(&signature, "encoder-a").await;

        assert_eq!(loaded, Some(set));
    }

    #[tokio::test]
    async fn test_load_misses_on_foreign_signature() {
        let dir = TempDir::new().unwrap();
        let cache = EmbeddingCache::new(dir.path(), "catalog");
        let set = sample_set();

        cache
            .store(&CatalogSignature::compute(b"old rows"), "encoder-a", &set)
            .await
            .unwrap();

        let loaded = cache
            .load(&CatalogSignature::compute(b"new rows"), "encoder-a")
            .await;
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_load_misses_on_foreign_encoder() {
        let dir = TempDir::new().unwrap();
        let cache = EmbeddingCache::new(dir.path(), "catalog");
        let signature = CatalogSignature::compute(b"rows");

        cache
            .store(&signature, "encoder-a", &sample_set())
            .await
            .unwrap();

        assert_eq!(cache.load(&signature, "encoder-b").await, None);
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = EmbeddingCache::new(dir.path(), "catalog");
        let signature = CatalogSignature::compute(b"rows");

        cache
            .store(&signature, "encoder-a", &sample_set())
            .await
            .unwrap();

        let (_, vectors_path) = cache.entry_paths("encoder-a");
        let mut blob = std::fs::read(&vectors_path).unwrap();
        blob[0] ^= 0xFF;
        std::fs::write(&vectors_path, blob).unwrap();

        assert_eq!(cache.load(&signature, "encoder-a").await, None);
    }

    #[tokio::test]
    async fn test_garbage_metadata_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = EmbeddingCache::new(dir.path(), "catalog");
        let signature = CatalogSignature::compute(b"rows");

        cache
            .store(&signature, "encoder-a", &sample_set())
            .await
            .unwrap();

        let (metadata_path, _) = cache.entry_paths("encoder-a");
        std::fs::write(&metadata_path, "not json").unwrap();

        assert_eq!(cache.load(&signature, "encoder-a").await, None);
    }

    #[tokio::test]
    async fn test_store_overwrites_prior_entry() {
        let dir = TempDir::new().unwrap();
        let cache = EmbeddingCache::new(dir.path(), "catalog");
        let signature = CatalogSignature::compute(b"rows");

        cache
            .store(&signature, "encoder-a", &sample_set())
            .await
            .unwrap();
        let replacement = EmbeddingSet::new(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        cache
            .store(&signature, "encoder-a", &replacement)
            .await
            .unwrap();

        assert_eq!(cache.load(&signature, "encoder-a").await, Some(replacement));
    }

    #[tokio::test]
    async fn test_encoder_id_with_slash_maps_to_one_file_stem() {
        let dir = TempDir::new().unwrap();
        let cache = EmbeddingCache::new(dir.path(), "catalog");
        let signature = CatalogSignature::compute(b"rows");
        let set = sample_set();

        cache
            .store(&signature, "org/encoder", &set)
            .await
            .unwrap();

        let (metadata_path, _) = cache.entry_paths("org/encoder");
        assert!(metadata_path.ends_with("catalog_org_encoder.json"));
        assert_eq!(cache.load(&signature, "org/encoder").await, Some(set));
    }
}
