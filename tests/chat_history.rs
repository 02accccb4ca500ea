use std::fs;
use std::sync::Arc;

use kv_store::{storage_root, value_file_name, FileStore};
use pretty_assertions::assert_eq;
use prompt_forge::{ChatHistory, CHAT_VERSIONS_KEY};

fn file_store(dir: &tempfile::TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::new(storage_root(dir.path())))
}

#[test]
fn history_survives_reopening_file_store() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut history = ChatHistory::load(file_store(&dir));
    history.record_if_changed("draft");
    history.record_if_changed("draft");
    history.record_if_changed("polished");

    let reopened = ChatHistory::load(file_store(&dir));
    assert_eq!(reopened.versions(), ["draft", "polished"]);
    assert_eq!(reopened.cursor(), Some(1));
}

#[test]
fn undo_position_is_not_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut history = ChatHistory::load(file_store(&dir));
    for text in ["a", "b", "c"] {
        history.record_if_changed(text);
    }
    assert_eq!(history.undo(), Ok("b"));

    let reopened = ChatHistory::load(file_store(&dir));
    assert_eq!(reopened.current(), Some("c"));
}

#[test]
fn corrupt_file_loads_as_empty_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = file_store(&dir);
    fs::create_dir_all(store.root()).expect("create storage dir");
    fs::write(store.root().join(value_file_name(CHAT_VERSIONS_KEY)), "[\"unterminated")
        .expect("write corrupt value");

    let mut history = ChatHistory::load(store.clone());
    assert!(history.is_empty());

    history.record_if_changed("fresh");
    let reopened = ChatHistory::load(store);
    assert_eq!(reopened.versions(), ["fresh"]);
}

#[test]
fn clear_removes_persisted_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = file_store(&dir);

    let mut history = ChatHistory::load(store.clone());
    history.record_if_changed("x");
    let path = store.root().join(value_file_name(CHAT_VERSIONS_KEY));
    assert!(path.exists());

    history.clear();
    assert!(!path.exists());
}
