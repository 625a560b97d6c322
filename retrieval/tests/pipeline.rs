//! End-to-end pipeline tests: catalog file → cache → index → typed surface.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use cinescout_embeddings::{Embedding, TextEncoder};
use cinescout_retrieval::{
    RetrievalConfig, RetrievalEngine, SearchRequest, SearchResponse, SummaryOutcome,
};

/// Axis-aligned stub: any text mentioning a known title gets that title's
/// unit vector, so expected scores are exact.
struct AxisEncoder {
    batch_calls: AtomicUsize,
}

impl AxisEncoder {
    fn new() -> Self {
        Self {
            batch_calls: AtomicUsize::new(0),
        }
    }

    fn vector_for(text: &str) -> Embedding {
        if text.contains("Aurora") {
            vec![1.0, 0.0]
        } else {
            vec![0.0, 1.0]
        }
    }
}

#[async_trait]
impl TextEncoder for AxisEncoder {
    fn id(&self) -> &str {
        "axis-encoder"
    }

    async fn encode(&self, text: &str) -> cinescout_embeddings::Result<Embedding> {
        Ok(Self::vector_for(text))
    }

    async fn encode_batch(&self, texts: &[String]) -> cinescout_embeddings::Result<Vec<Embedding>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

fn write_catalog(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("catalog.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"title,genre,release_year\nAurora,sci-fi,2019\nBlackwood,horror,2021\n")
        .unwrap();
    path
}

#[tokio::test]
async fn full_pipeline_serves_the_typed_surface() {
    let dir = TempDir::new().unwrap();
    let config = RetrievalConfig::new(write_catalog(&dir))
        .with_cache_dir(dir.path().join("cache"))
        .with_collection("movies");

    let engine = RetrievalEngine::new(config, Arc::new(AxisEncoder::new()))
        .await
        .unwrap();

    let outcome = engine
        .handle(SearchRequest::new("something like Aurora").with_top_k(1))
        .await
        .unwrap();
    let response = SearchResponse::from(&outcome);

    assert_eq!(response.results.len(), 1);
    let result = &response.results[0];
    assert_eq!(result.title, "Aurora");
    assert_eq!(result.category, Some("sci-fi".to_string()));
    assert_eq!(result.release_year, Some(2019));
    assert!((result.score - 1.0).abs() < 1e-6);
    assert_eq!(response.summary, None);
    assert_eq!(outcome.summary, SummaryOutcome::Disabled);
}

#[tokio::test]
async fn cache_survives_engine_restarts() {
    let dir = TempDir::new().unwrap();
    let config = RetrievalConfig::new(write_catalog(&dir))
        .with_cache_dir(dir.path().join("cache"))
        .with_collection("movies");
    let encoder = Arc::new(AxisEncoder::new());

    let first = RetrievalEngine::new(config.clone(), encoder.clone())
        .await
        .unwrap();
    let first_hits = first.search("Aurora", 2).await.unwrap();
    drop(first);

    let second = RetrievalEngine::new(config, encoder.clone())
        .await
        .unwrap();
    let second_hits = second.search("Aurora", 2).await.unwrap();

    assert_eq!(encoder.batch_calls.load(Ordering::SeqCst), 1);

    let ranked = |hits: &[cinescout_retrieval::SearchHit]| {
        hits.iter()
            .map(|h| (h.title.clone(), h.score))
            .collect::<Vec<_>>()
    };
    assert_eq!(ranked(&first_hits), ranked(&second_hits));
}

#[tokio::test]
async fn foreign_encoder_does_not_reuse_the_cache() {
    let dir = TempDir::new().unwrap();
    let config = RetrievalConfig::new(write_catalog(&dir))
        .with_cache_dir(dir.path().join("cache"))
        .with_collection("movies");

    struct RenamedEncoder(AxisEncoder);

    #[async_trait]
    impl TextEncoder for RenamedEncoder {
        fn id(&self) -> &str {
            "other-encoder"
        }

        async fn encode(&self, text: &str) -> cinescout_embeddings::Result<Embedding> {
            self.0.encode(text).await
        }

        async fn encode_batch(
            &self,
            texts: &[String],
        ) -> cinescout_embeddings::Result<Vec<Embedding>> {
            self.0.encode_batch(texts).await
        }
    }

    let first_encoder = Arc::new(AxisEncoder::new());
    RetrievalEngine::new(config.clone(), first_encoder.clone())
        .await
        .unwrap();

    let renamed = Arc::new(RenamedEncoder(AxisEncoder::new()));
    RetrievalEngine::new(config, renamed.clone()).await.unwrap();

    // Different encoder identifier, so the second startup re-embeds.
    assert_eq!(first_encoder.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(renamed.0.batch_calls.load(Ordering::SeqCst), 1);
}
