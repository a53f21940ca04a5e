use news_radar::{FileStorage, KvStorage, TopicRegistry, PRESET_TOPICS, SAVED_TOPICS_KEY};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_storage_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "news-radar-test-{}-{}-{}",
        tag,
        std::process::id(),
        nanos
    ))
}

#[test]
fn saved_topic_survives_reload_exactly_once_after_presets() {
    let dir = temp_storage_path("reload");
    let path = dir.join("storage.json");

    {
        let mut registry = TopicRegistry::load(Box::new(FileStorage::new(path.clone())));
        assert!(registry.add("太空探索").unwrap());
    }

    let registry = TopicRegistry::load(Box::new(FileStorage::new(path)));
    let list = registry.list();
    assert_eq!(&list[..PRESET_TOPICS.len()], PRESET_TOPICS);
    assert_eq!(&list[PRESET_TOPICS.len()..], ["太空探索"]);
    assert_eq!(
        list.iter().filter(|t| **t == "太空探索").count(),
        1,
        "saved topic must appear exactly once"
    );

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn corrupt_storage_file_never_breaks_startup() {
    let dir = temp_storage_path("corrupt");
    let path = dir.join("storage.json");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&path, "{{{ definitely not json").unwrap();

    let registry = TopicRegistry::load(Box::new(FileStorage::new(path)));
    assert!(registry.saved().is_empty());
    assert_eq!(registry.list().len(), PRESET_TOPICS.len());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn corrupt_value_under_the_key_falls_back_to_empty() {
    let dir = temp_storage_path("badvalue");
    let path = dir.join("storage.json");

    let mut storage = FileStorage::new(path.clone());
    storage.set(SAVED_TOPICS_KEY, "not a json array").unwrap();

    let registry = TopicRegistry::load(Box::new(FileStorage::new(path)));
    assert!(registry.saved().is_empty());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn storage_writes_persist_the_full_list() {
    let dir = temp_storage_path("full-list");
    let path = dir.join("storage.json");

    let mut registry = TopicRegistry::load(Box::new(FileStorage::new(path.clone())));
    registry.add("甲").unwrap();
    registry.add("乙").unwrap();
    registry.remove("甲").unwrap();

    let storage = FileStorage::new(path);
    let raw = storage.get(SAVED_TOPICS_KEY).expect("key must exist");
    let saved: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved, ["乙"]);

    let _ = fs::remove_dir_all(dir);
}
