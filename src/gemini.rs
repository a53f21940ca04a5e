use crate::sources::RawCitation;
use crate::types::{GeminiConfig, RadarError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable holding the opaque API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// What the upstream call yields: the free-text body plus the side-channel
/// citation records from grounding metadata.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: String,
    pub citations: Vec<RawCitation>,
}

/// Seam over the hosted generative-language service, so the fetch client and
/// the tests do not care whether a real network call happens.
#[async_trait]
pub trait NewsModel: Send + Sync {
    /// Model identifier, for diagnostics.
    fn model_name(&self) -> String;

    /// Issue one generation request with web search enabled.
    async fn generate(&self, prompt: &str) -> Result<ModelReply>;
}

// ------------------------------------------------------------
// Wire types for the Generative Language REST API
// ------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Tool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<RawCitation>,
}

// ------------------------------------------------------------
// Real client
// ------------------------------------------------------------

/// Gemini-backed implementation over the REST `generateContent` endpoint
/// with the `google_search` tool enabled.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(api_key: String, config: GeminiConfig) -> Result<Self> {
        if api_key.is_empty() {
            return Err(RadarError::MissingApiKey(API_KEY_ENV));
        }
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Reads the credential from `GEMINI_API_KEY`.
    pub fn from_env(config: GeminiConfig) -> Result<Self> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| RadarError::MissingApiKey(API_KEY_ENV))?;
        Self::new(api_key, config)
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl NewsModel for GeminiClient {
    fn model_name(&self) -> String {
        self.config.model.clone()
    }

    async fn generate(&self, prompt: &str) -> Result<ModelReply> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            tools: vec![Tool {
                google_search: serde_json::Map::new(),
            }],
        };

        debug!("calling {} ({} byte prompt)", self.config.model, prompt.len());

        let response = self
            .http
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RadarError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let candidate = body.candidates.into_iter().next();

        let text = candidate
            .as_ref()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let citations = candidate
            .and_then(|c| c.grounding_metadata)
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .collect::<Vec<_>>();

        info!(
            "model replied with {} bytes of text and {} grounding chunks",
            text.len(),
            citations.len()
        );

        Ok(ModelReply { text, citations })
    }
}

// ------------------------------------------------------------
// Mock model for tests and offline runs
// ------------------------------------------------------------

/// Canned model for tests: returns a fixed reply, or a fixed failure.
pub struct MockNewsModel {
    reply: std::result::Result<ModelReply, String>,
}

impl MockNewsModel {
    pub fn replying(reply: ModelReply) -> Self {
        Self { reply: Ok(reply) }
    }

    pub fn replying_text(text: impl Into<String>) -> Self {
        Self::replying(ModelReply {
            text: text.into(),
            citations: Vec::new(),
        })
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
        }
    }
}

#[async_trait]
impl NewsModel for MockNewsModel {
    fn model_name(&self) -> String {
        "mock".to_string()
    }

    async fn generate(&self, _prompt: &str) -> Result<ModelReply> {
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(RadarError::General(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_envelope_deserializes() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "一段" }, { "text": "文本" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://x.com", "title": "X" } },
                        { "web": {} },
                        {}
                    ]
                }
            }]
        });
        let parsed: GenerateResponse = serde_json::from_value(body).unwrap();
        let candidate = &parsed.candidates[0];
        assert_eq!(candidate.content.as_ref().unwrap().parts.len(), 2);
        let chunks = &candidate.grounding_metadata.as_ref().unwrap().grounding_chunks;
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks[0].web.as_ref().unwrap().uri.as_deref(),
            Some("https://x.com")
        );
    }

    #[test]
    fn request_serializes_with_search_tool() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "话题" }],
            }],
            tools: vec![Tool {
                google_search: serde_json::Map::new(),
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "话题");
        assert!(value["tools"][0]["google_search"].is_object());
    }

    #[test]
    fn empty_key_is_rejected() {
        // `.err()` rather than `.unwrap_err()`: the client holds the API key
        // and deliberately has no Debug impl.
        let err = GeminiClient::new(String::new(), GeminiConfig::default()).err();
        assert!(matches!(err, Some(RadarError::MissingApiKey(API_KEY_ENV))));
    }
}
