pub mod client;
pub mod controller;
pub mod extract;
pub mod gemini;
pub mod sources;
pub mod topics;
pub mod types;

pub use client::{build_prompt, NewsClient};
pub use controller::{AppController, FetchTicket, Phase, FETCH_FAILED_MESSAGE};
pub use extract::extract_json;
pub use gemini::{GeminiClient, MockNewsModel, ModelReply, NewsModel, API_KEY_ENV};
pub use sources::{dedup_citations, RawCitation, MAX_SOURCES};
pub use topics::{
    FileStorage, KvStorage, MemoryStorage, TopicRegistry, PRESET_TOPICS, SAVED_TOPICS_KEY,
};
pub use types::{GeminiConfig, ImpactLevel, NewsItem, RadarError, Result, Source};
