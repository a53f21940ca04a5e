use crate::client::NewsClient;
use crate::topics::{TopicRegistry, PRESET_TOPICS};
use crate::types::{NewsItem, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Localized failure message shown for transport/service errors.
pub const FETCH_FAILED_MESSAGE: &str = "获取最新新闻失败，请重试。";

/// Fetch lifecycle state.
///
/// An empty result list is a valid `Loaded` (rendered as an empty state),
/// distinct from `Error`, which only transport/service failures produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// Handle for one in-flight fetch: the sequence number deciding freshness
/// and the topic the request was issued for.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub seq: u64,
    pub topic: String,
}

/// Drives the overall interaction: current topic, current news list,
/// loading/error state, read markers, and the saved-topic registry.
///
/// Fetches are split into `begin_fetch` / `complete_fetch` so the caller
/// owns the await. Each begun fetch gets a monotonically increasing sequence
/// number and a completion is applied only if it is newer than the last one
/// applied, so a stale response from rapid topic switching can never
/// overwrite a fresher result.
pub struct AppController {
    registry: TopicRegistry,
    topic: String,
    news: Vec<NewsItem>,
    phase: Phase,
    read_ids: HashSet<String>,
    last_loaded_at: Option<DateTime<Utc>>,
    next_seq: u64,
    applied_seq: u64,
}

impl AppController {
    pub fn new(registry: TopicRegistry) -> Self {
        Self {
            registry,
            topic: PRESET_TOPICS[0].to_string(),
            news: Vec::new(),
            phase: Phase::Idle,
            read_ids: HashSet::new(),
            last_loaded_at: None,
            next_seq: 0,
            applied_seq: 0,
        }
    }

    // ---- presentation boundary -----------------------------------------

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn news(&self) -> &[NewsItem] {
        &self.news
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// When the current news list was loaded, if it ever was.
    pub fn last_loaded_at(&self) -> Option<DateTime<Utc>> {
        self.last_loaded_at
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// All topics, presets first, then saved.
    pub fn topics(&self) -> Vec<&str> {
        self.registry.list()
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.read_ids.contains(id)
    }

    pub fn read_count(&self) -> usize {
        self.read_ids.len()
    }

    // ---- fetch lifecycle ------------------------------------------------

    /// Enters `Loading` for the current topic and hands out the ticket the
    /// eventual completion must present. Re-entrant: beginning a new fetch
    /// while one is in flight does not cancel the old one, it just outranks
    /// it.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_seq += 1;
        self.phase = Phase::Loading;
        debug!("fetch #{} begun for topic '{}'", self.next_seq, self.topic);
        FetchTicket {
            seq: self.next_seq,
            topic: self.topic.clone(),
        }
    }

    /// Applies a settled fetch. Returns `false` (and changes nothing) when a
    /// newer completion has already been applied.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, outcome: Result<Vec<NewsItem>>) -> bool {
        if ticket.seq <= self.applied_seq {
            debug!(
                "discarding stale fetch #{} (latest applied: #{})",
                ticket.seq, self.applied_seq
            );
            return false;
        }
        self.applied_seq = ticket.seq;
        match outcome {
            Ok(items) => {
                info!("fetch #{} loaded {} items", ticket.seq, items.len());
                self.news = items;
                self.phase = Phase::Loaded;
                self.last_loaded_at = Some(Utc::now());
            }
            Err(e) => {
                warn!("fetch #{} failed: {}", ticket.seq, e);
                self.news.clear();
                self.phase = Phase::Error(FETCH_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Switches the active topic and begins a fetch for it.
    pub fn select_topic(&mut self, topic: &str) -> FetchTicket {
        self.topic = topic.to_string();
        self.begin_fetch()
    }

    /// Re-issues a fetch for the identical current topic.
    pub fn retry(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Begin-await-complete in one call, for single-threaded callers.
    pub async fn refresh(&mut self, client: &NewsClient) -> bool {
        let ticket = self.begin_fetch();
        let outcome = client.fetch_breaking_news(&ticket.topic).await;
        self.complete_fetch(&ticket, outcome)
    }

    // ---- topics ---------------------------------------------------------

    /// Saves a topic to the registry. Returns whether anything changed.
    pub fn save_topic(&mut self, topic: &str) -> Result<bool> {
        self.registry.add(topic)
    }

    /// Saves the currently active topic, a no-op when it is a preset or
    /// already saved.
    pub fn save_current(&mut self) -> Result<bool> {
        let topic = self.topic.clone();
        self.registry.add(&topic)
    }

    /// Removes a saved topic. Removing the active topic falls back to the
    /// first preset and returns the ticket for the fetch the caller must now
    /// run; removing any other topic returns `None`.
    pub fn delete_topic(&mut self, topic: &str) -> Result<Option<FetchTicket>> {
        if !self.registry.remove(topic)? {
            return Ok(None);
        }
        if self.topic == topic {
            self.topic = PRESET_TOPICS[0].to_string();
            return Ok(Some(self.begin_fetch()));
        }
        Ok(None)
    }

    // ---- read tracking --------------------------------------------------

    /// Opens an item's detail view: marks it read (idempotent) and returns
    /// it, or `None` if no such item is currently displayed.
    pub fn open_item(&mut self, id: &str) -> Option<&NewsItem> {
        let item = self.news.iter().find(|item| item.id == id)?;
        self.read_ids.insert(id.to_string());
        Some(item)
    }

    /// Empties the read-marker set unconditionally.
    pub fn clear_read(&mut self) {
        self.read_ids.clear();
    }
}
