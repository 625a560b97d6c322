//! # Summarize
//!
//! Optional natural-language synthesis over ranked search hits, produced by
//! an external OpenAI-compatible chat-completion endpoint.
//!
//! Summarization is strictly opt-in: with no model configured the adapter
//! returns an absent summary immediately, without any network activity, so
//! it can never block a plain search. Each call is a single attempt with no
//! retries and no state carried between calls.

pub mod error;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

pub use error::{Result, SummarizeError};

/// Default request timeout for the completion call.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One ranked hit handed to the summarizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Display title of the item.
    pub title: String,

    /// Cosine score the hit was ranked by.
    pub score: f32,

    /// The full item record.
    pub payload: serde_json::Value,
}

/// Configuration for the summarization adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Completion model. `None` disables summarization entirely.
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint. Defaults to the stock
    /// OpenAI API.
    pub base_url: Option<String>,

    /// API key for the endpoint.
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: None,
            base_url: None,
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SummarizerConfig {
    /// Set the completion model, enabling summarization.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the endpoint base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Stateless adapter that turns a ranked hit list plus the original query
/// into a short natural-language synopsis.
pub struct Summarizer {
    config: SummarizerConfig,
    client: reqwest::Client,
}

impl Summarizer {
    /// Create an adapter from its configuration.
    pub fn new(config: SummarizerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Whether a model is configured.
    pub fn is_enabled(&self) -> bool {
        self.config.model.is_some()
    }

    /// Summarize `candidates` for the query `prompt`.
    ///
    /// Returns `Ok(None)` immediately, without any external call, when no
    /// model is configured. Any failure of the external call surfaces as a
    /// [`SummarizeError`]; the caller's search hits remain valid either way.
    pub async fn summarize(&self, candidates: &[Candidate], prompt: &str) -> Result<Option<String>> {
        let Some(model) = &self.config.model else {
            debug!("summarization disabled: no model configured");
            return Ok(None);
        };

        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1");
        let body = json!({
            "model": model,
            "messages": build_messages(candidates, prompt),
        });

        debug!("requesting summary of {} candidates from {model}", candidates.len());

        let mut request = self
            .client
            .post(format!("{base_url}/chat/completions"))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SummarizeError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                SummarizeError::InvalidResponse("no completion choice in response".to_string())
            })?;

        Ok(Some(text))
    }
}

/// Build the chat messages for a summarization request: a fixed system role
/// plus the query and one line per candidate.
fn build_messages(candidates: &[Candidate], prompt: &str) -> serde_json::Value {
    let candidate_lines: Vec<String> = candidates
        .iter()
        .map(|c| format!("- {} (score {:.4}): {}", c.title, c.score, c.payload))
        .collect();

    json!([
        {
            "role": "system",
            "content": "You recommend items from the provided candidates.",
        },
        {
            "role": "user",
            "content": format!("Prompt: {prompt}\nCandidates:\n{}", candidate_lines.join("\n")),
        },
    ])
}

/// OpenAI chat-completion response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
