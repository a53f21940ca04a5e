use serde::{Deserialize, Serialize};

/// Impact level assigned by the model to a news item.
///
/// The wire values are `"HIGH"` / `"MEDIUM"` / `"LOW"`; anything else the
/// model invents folds to `Medium`. A missing field is a deserialization
/// error and drops the item at the fetch-client boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImpactLevel {
    High,
    Low,
    // Keep last: serde requires the catch-all variant at the end.
    #[serde(other)]
    Medium,
}

/// A web page the model consulted while assembling a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// One breaking-news card.
///
/// Constructed fresh on every fetch and discarded on the next one; nothing
/// here is persisted. `timestamp` is the model's human-phrased relative time
/// ("2小时前", "刚刚") and is not machine-parseable. `sources` is filled in
/// by the fetch client with the batch-level citation list shared across all
/// items of one fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub full_content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_date: Option<String>,
    pub category: String,
    pub impact_level: ImpactLevel,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Configuration for the Gemini-backed upstream call.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            user_agent: "news-radar/0.1".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RadarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("missing API credential: set {0}")]
    MissingApiKey(&'static str),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, RadarError>;
