//! Typed query surface.
//!
//! These are the request/response shapes consumed by the (external) HTTP or
//! CLI front-end. The engine validates and serves them; marshalling stays
//! out of this crate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{SearchHit, SearchOutcome, SummaryOutcome};

fn default_top_k() -> usize {
    3
}

/// A search request: a free-text prompt plus result-shaping options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query. Must be nonblank after trimming.
    pub prompt: String,

    /// Number of matches to return, 1..=20.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Whether to also produce a natural-language summary of the hits.
    #[serde(default)]
    pub summarize: bool,
}

impl SearchRequest {
    /// Create a request with default options.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            top_k: default_top_k(),
            summarize: false,
        }
    }

    /// Set the number of matches to return.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Request a summary alongside the hits.
    pub fn with_summarize(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }
}

/// One item in a search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title.
    pub title: String,

    /// Item category, when the payload carries one.
    pub category: Option<String>,

    /// Release year, when the payload carries one.
    pub release_year: Option<i64>,

    /// Similarity score.
    pub score: f32,

    /// The full item record.
    pub payload: Value,
}

impl SearchResult {
    /// Project a search hit into the response shape, extracting the common
    /// category and release-year columns leniently from the payload.
    pub fn from_hit(hit: &SearchHit) -> Self {
        Self {
            title: hit.title.clone(),
            category: lenient_str(&hit.payload, &["category", "genre"]),
            release_year: lenient_int(&hit.payload, &["release_year", "Release Year"]),
            score: hit.score,
            payload: hit.payload.clone(),
        }
    }
}

/// A search response: ranked results plus the optional summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Ranked results, descending by score.
    pub results: Vec<SearchResult>,

    /// Generated summary, present only when one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl From<&SearchOutcome> for SearchResponse {
    fn from(outcome: &SearchOutcome) -> Self {
        let summary = match &outcome.summary {
            SummaryOutcome::Text(text) => Some(text.clone()),
            SummaryOutcome::Disabled | SummaryOutcome::Failed(_) => None,
        };
        Self {
            results: outcome.hits.iter().map(SearchResult::from_hit).collect(),
            summary,
        }
    }
}

/// First nonempty string under any of `keys`, trimmed. Numbers render as
/// text.
fn lenient_str(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match payload.get(*key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First integral value under any of `keys`. Accepts integers, finite
/// floats, and numeric strings.
fn lenient_int(payload: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match payload.get(*key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
