//! Text encoder capability.
//!
//! The encoder maps free text to a fixed-dimension numeric vector. It is an
//! injected capability: the retrieval pipeline never hard-wires a specific
//! model, and tests substitute deterministic stubs. The encoder identifier
//! doubles as the cache partition key, so one encoder identity covers both
//! catalog embedding and query embedding.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Trait for text encoders.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Identifier of this encoder. Used as the cache partition key; vectors
    /// produced under different identifiers are never mixed.
    fn id(&self) -> &str;

    /// Encode one text into a fixed-dimension vector.
    async fn encode(&self, text: &str) -> Result<Embedding>;

    /// Encode a batch of texts, one vector per input in input order, with
    /// per-item semantics identical to [`TextEncoder::encode`].
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        // Default implementation: process sequentially.
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.encode(text).await?);
        }
        Ok(vectors)
    }
}

/// Encoder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEncoder {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Embedding model; also the encoder identifier.
    model: String,
}

impl OpenAIEncoder {
    /// Create a new encoder with the stock OpenAI endpoint and model.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL, e.g. for a local OpenAI-compatible server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Whether the encoder has a credential configured.
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn request(&self, input: serde_json::Value) -> Result<OpenAIEmbeddingResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::EncoderNotConfigured)?;

        let body = serde_json::json!({
            "input": input,
            "model": self.model,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        Ok(response.json().await?)
    }
}

impl Default for OpenAIEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextEncoder for OpenAIEncoder {
    fn id(&self) -> &str {
        &self.model
    }

    async fn encode(&self, text: &str) -> Result<Embedding> {
        debug!("encoding one text with model {}", self.model);

        let result = self.request(serde_json::json!(text)).await?;
        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| {
                EmbeddingError::InvalidResponse("no embedding in response".to_string())
            })?
            .embedding;

        Ok(embedding)
    }

    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "encoding batch of {} texts with model {}",
            texts.len(),
            self.model
        );

        let result = self.request(serde_json::json!(texts)).await?;
        if result.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "{} embeddings returned for {} inputs",
                result.data.len(),
                texts.len()
            )));
        }

        let vectors: Vec<Embedding> = result.data.into_iter().map(|item| item.embedding).collect();
        info!("encoded {} texts", vectors.len());

        Ok(vectors)
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}
