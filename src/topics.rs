use crate::types::Result;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Built-in topic labels, always present, not user-removable.
pub const PRESET_TOPICS: &[&str] = &[
    "人工智能新闻",
    "生物技术新闻",
    "军事新闻",
    "政治新闻",
    "经济新闻",
    "量子计算新闻",
    "A股上市公司最新财报披露情况",
    "港股上市公司最新财报披露",
    "美股上市公司最新财报披露",
];

/// Storage key holding the serialized saved-topic list.
pub const SAVED_TOPICS_KEY: &str = "user_saved_topics";

/// Durable key-value storage collaborator: two operations, one key in use.
pub trait KvStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed storage: a flat JSON object map in one file.
///
/// An unreadable or unparseable file behaves as empty; writes create parent
/// directories as needed.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location under the platform data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("news-radar")
            .join("storage.json")
    }

    fn read_map(&self) -> HashMap<String, String> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        match serde_json::from_str(&contents) {
            Ok(map) => map,
            Err(e) => {
                warn!("storage file {} is corrupt: {}", self.path.display(), e);
                HashMap::new()
            }
        }
    }
}

impl KvStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    map: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The set of built-in and user-saved topic labels.
///
/// Saved topics contain no duplicates and no entries equal to a preset.
/// Every effective mutation synchronously writes the full saved list back to
/// storage; loading tolerates absent or corrupt storage by starting empty.
pub struct TopicRegistry {
    saved: Vec<String>,
    storage: Box<dyn KvStorage>,
}

impl TopicRegistry {
    pub fn load(storage: Box<dyn KvStorage>) -> Self {
        let saved = match storage.get(SAVED_TOPICS_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    warn!("saved topics are corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        debug!("loaded {} saved topics", saved.len());
        Self { saved, storage }
    }

    pub fn is_preset(topic: &str) -> bool {
        PRESET_TOPICS.contains(&topic)
    }

    pub fn is_saved(&self, topic: &str) -> bool {
        self.saved.iter().any(|t| t == topic)
    }

    /// Saved topics in insertion order.
    pub fn saved(&self) -> &[String] {
        &self.saved
    }

    /// All topics: presets in fixed order, then saved topics.
    pub fn list(&self) -> Vec<&str> {
        PRESET_TOPICS
            .iter()
            .copied()
            .chain(self.saved.iter().map(String::as_str))
            .collect()
    }

    /// Saves a topic. No-op (returns `Ok(false)`) when the trimmed label is
    /// blank, a preset, or already saved.
    pub fn add(&mut self, topic: &str) -> Result<bool> {
        let topic = topic.trim();
        if topic.is_empty() || Self::is_preset(topic) || self.is_saved(topic) {
            return Ok(false);
        }
        self.saved.push(topic.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Removes a saved topic. No-op (returns `Ok(false)`) when the topic is
    /// not in the saved set. Presets are untouchable by construction.
    pub fn remove(&mut self, topic: &str) -> Result<bool> {
        let before = self.saved.len();
        self.saved.retain(|t| t != topic);
        if self.saved.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.saved)?;
        self.storage.set(SAVED_TOPICS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TopicRegistry {
        TopicRegistry::load(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn add_rejects_blank_preset_and_duplicate() {
        let mut reg = registry();
        assert!(!reg.add("").unwrap());
        assert!(!reg.add("   ").unwrap());
        assert!(!reg.add(PRESET_TOPICS[0]).unwrap());
        assert!(reg.add("太空探索").unwrap());
        assert!(!reg.add("太空探索").unwrap());
        assert!(!reg.add("  太空探索  ").unwrap());
        assert_eq!(reg.saved(), ["太空探索"]);
    }

    #[test]
    fn remove_nonmember_is_noop() {
        let mut reg = registry();
        assert!(!reg.remove("量子计算新闻").unwrap());
        assert!(!reg.remove("nope").unwrap());
        reg.add("加密货币").unwrap();
        assert!(reg.remove("加密货币").unwrap());
        assert!(reg.saved().is_empty());
    }

    #[test]
    fn list_orders_presets_then_saved() {
        let mut reg = registry();
        reg.add("b").unwrap();
        reg.add("a").unwrap();
        let list = reg.list();
        assert_eq!(&list[..PRESET_TOPICS.len()], PRESET_TOPICS);
        assert_eq!(&list[PRESET_TOPICS.len()..], ["b", "a"]);
    }

    #[test]
    fn corrupt_storage_falls_back_to_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(SAVED_TOPICS_KEY, "not json at all").unwrap();
        let reg = TopicRegistry::load(Box::new(storage));
        assert!(reg.saved().is_empty());
    }

    #[test]
    fn mutations_persist_round_trip() {
        let mut storage = MemoryStorage::new();
        storage
            .set(SAVED_TOPICS_KEY, r#"["早先保存"]"#)
            .unwrap();
        let mut reg = TopicRegistry::load(Box::new(storage));
        assert!(reg.is_saved("早先保存"));
        reg.add("新话题").unwrap();
        assert_eq!(reg.saved(), ["早先保存", "新话题"]);
    }
}
