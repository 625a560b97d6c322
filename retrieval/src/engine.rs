//! Retrieval engine implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cinescout_catalog::Catalog;
use cinescout_embeddings::{
    CatalogSignature, EmbeddingCache, EmbeddingError, EmbeddingSet, IndexEntry, ScoredEntry,
    SimilarityIndex, TextEncoder,
};
use cinescout_summarize::{Candidate, Summarizer};

use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::protocol::SearchRequest;

/// A ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Display title of the matched item.
    pub title: String,

    /// Cosine similarity to the query.
    pub score: f32,

    /// The full item record.
    pub payload: serde_json::Value,
}

/// Outcome of the optional summarization step.
///
/// `Disabled` (no model configured, or not requested) and `Failed` (the
/// external call went wrong) are deliberately distinct states; in both the
/// accompanying hits remain valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Summarization was not requested or no model is configured.
    Disabled,

    /// The generated synopsis.
    Text(String),

    /// The external call failed; carries the rendered error.
    Failed(String),
}

/// Result of handling a typed search request: the ranked hits plus the
/// summarization outcome.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Ranked hits, descending by score.
    pub hits: Vec<SearchHit>,

    /// What happened to the optional summary.
    pub summary: SummaryOutcome,
}

/// The retrieval pipeline.
///
/// Construction runs the full one-time startup sequence (load the catalog,
/// compute its signature, fetch or compute the embeddings, rebuild the
/// index), so a constructed engine is always ready to search and a
/// half-initialized engine cannot exist. The same injected encoder embeds
/// both the catalog and every query; mixing encoders would silently produce
/// meaningless scores.
pub struct RetrievalEngine {
    config: RetrievalConfig,
    encoder: Arc<dyn TextEncoder>,
    encoder_id: String,
    index: SimilarityIndex,
    summarizer: Summarizer,
}

impl RetrievalEngine {
    /// Initialize the pipeline: load the catalog, reuse or compute its
    /// embeddings, and rebuild the similarity index.
    ///
    /// Loader and encoder errors propagate and nothing partially
    /// initializes. An unreadable cache entry is recomputed, never fatal.
    pub async fn new(config: RetrievalConfig, encoder: Arc<dyn TextEncoder>) -> Result<Self> {
        info!(
            "initializing retrieval engine from {}",
            config.dataset_path.display()
        );

        let catalog = Catalog::load(&config.dataset_path, &config.title_field).await?;
        if catalog.is_empty() {
            return Err(EmbeddingError::EmptyCatalog.into());
        }

        let signature = CatalogSignature::compute(catalog.raw_bytes());
        let cache = EmbeddingCache::new(&config.cache_dir, &config.collection);
        let encoder_id = encoder.id().to_string();

        let embeddings = match cache.load(&signature, &encoder_id).await {
            Some(set) => {
                info!("embedding cache hit: {} vectors", set.len());
                set
            }
            None => {
                let texts = catalog.embedding_texts();
                info!(
                    "embedding cache miss: encoding {} records with {encoder_id}",
                    texts.len()
                );
                let vectors = encoder.encode_batch(&texts).await?;
                let set = EmbeddingSet::new(vectors)?;
                cache.store(&signature, &encoder_id, &set).await?;
                set
            }
        };
        if embeddings.len() != catalog.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "{} embeddings for {} catalog records",
                embeddings.len(),
                catalog.len()
            ))
            .into());
        }

        let entries: Vec<IndexEntry> = catalog
            .records()
            .iter()
            .zip(embeddings.into_vectors())
            .enumerate()
            .map(|(row, (record, embedding))| IndexEntry {
                row,
                embedding,
                payload: record.to_payload(),
            })
            .collect();
        let mut index = SimilarityIndex::new();
        index.rebuild(entries)?;

        let summarizer = Summarizer::new(config.summarize.clone());

        info!("retrieval engine ready: {} items indexed", index.len());
        Ok(Self {
            config,
            encoder,
            encoder_id,
            index,
            summarizer,
        })
    }

    /// Identifier of the encoder this engine was initialized with.
    pub fn encoder_id(&self) -> &str {
        &self.encoder_id
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index is empty. Always false for a constructed engine.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Search the catalog for the `k` items most similar to `prompt`.
    ///
    /// Fails with [`RetrievalError::EmptyPrompt`] when the prompt is blank
    /// after trimming, before any encoding work happens. `k` beyond the
    /// catalog size is clamped.
    pub async fn search(&self, prompt: &str, k: usize) -> Result<Vec<SearchHit>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(RetrievalError::EmptyPrompt);
        }

        debug!("searching top {k} for prompt ({} chars)", prompt.len());
        let query = self.encoder.encode(prompt).await?;
        let matches = self.index.search(&query, k)?;

        Ok(matches.into_iter().map(|m| self.to_hit(m)).collect())
    }

    /// Handle a typed search request, including the optional summarization
    /// step.
    ///
    /// A summarization failure is folded into the outcome as
    /// [`SummaryOutcome::Failed`]: the hits are still returned, and the
    /// failure never affects engine state or other requests.
    pub async fn handle(&self, request: SearchRequest) -> Result<SearchOutcome> {
        let max = self.config.query.max_top_k;
        if !(1..=max).contains(&request.top_k) {
            return Err(RetrievalError::InvalidTopK {
                min: 1,
                max,
                got: request.top_k,
            });
        }

        let hits = self.search(&request.prompt, request.top_k).await?;

        let summary = if !request.summarize {
            SummaryOutcome::Disabled
        } else {
            let candidates: Vec<Candidate> = hits
                .iter()
                .map(|hit| Candidate {
                    title: hit.title.clone(),
                    score: hit.score,
                    payload: hit.payload.clone(),
                })
                .collect();
            match self
                .summarizer
                .summarize(&candidates, request.prompt.trim())
                .await
            {
                Ok(Some(text)) => SummaryOutcome::Text(text),
                Ok(None) => SummaryOutcome::Disabled,
                Err(e) => {
                    warn!("summarization failed, returning hits without a summary: {e}");
                    SummaryOutcome::Failed(e.to_string())
                }
            }
        };

        Ok(SearchOutcome { hits, summary })
    }

    fn to_hit(&self, entry: ScoredEntry) -> SearchHit {
        let title = entry
            .payload
            .get(&self.config.title_field)
            .and_then(serde_json::Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();
        SearchHit {
            title,
            score: entry.score,
            payload: entry.payload,
        }
    }
}
