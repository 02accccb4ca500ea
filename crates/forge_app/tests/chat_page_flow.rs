mod support;

use std::sync::Arc;

use ai_gateway::Provider;
use forge_app::app::{ChatPage, NoticeKind, HISTORY_CLEARED_MESSAGE, OPTIMIZED_MESSAGE};
use kv_store::{KeyValueStore, MemoryStore};
use pretty_assertions::assert_eq;
use prompt_forge::{ForgeError, CHAT_VERSIONS_KEY};
use serde_json::json;
use support::{Harness, NoticeSpy};

fn page(harness: &Harness) -> ChatPage {
    ChatPage::new(harness.gateway.clone(), harness.store.clone())
}

#[test]
fn optimize_records_input_and_result() {
    let harness = Harness::new();
    harness
        .gateway
        .push_reply(json!({"choices": [{"message": {"content": "Tighter text."}}]}));
    let mut page = page(&harness);
    let mut notices = NoticeSpy::default();
    page.set_input("some loose text");

    let optimized = page
        .optimize(Provider::Gpt, &mut notices)
        .expect("optimize should succeed")
        .to_string();

    assert_eq!(optimized, "Tighter text.");
    assert_eq!(page.input(), "Tighter text.");
    assert_eq!(page.history().versions(), ["some loose text", "Tighter text."]);
    assert_eq!(notices.messages(), vec![OPTIMIZED_MESSAGE]);
    assert!(harness.gateway.calls()[0]
        .prompt
        .ends_with("Text to Optimize:\nsome loose text"));
    assert_eq!(
        harness.store.get(CHAT_VERSIONS_KEY).expect("get").as_deref(),
        Some(r#"["some loose text","Tighter text."]"#)
    );
}

#[test]
fn repeated_optimize_of_unchanged_text_does_not_duplicate_versions() {
    let harness = Harness::new();
    harness.gateway.push_reply(json!("same"));
    harness.gateway.push_reply(json!("same"));
    let mut page = page(&harness);
    let mut notices = NoticeSpy::default();
    page.set_input("same");

    page.optimize(Provider::Claude, &mut notices).expect("first");
    page.optimize(Provider::Claude, &mut notices).expect("second");

    assert_eq!(page.history().versions(), ["same"]);
}

#[test]
fn blank_input_is_rejected_without_recording() {
    let harness = Harness::new();
    let mut page = page(&harness);
    let mut notices = NoticeSpy::default();
    page.set_input(" \t ");

    assert_eq!(
        page.optimize(Provider::Claude, &mut notices),
        Err(ForgeError::EmptyInput)
    );
    assert!(page.history().is_empty());
    assert_eq!(notices.errors(), 1);
}

#[test]
fn failed_optimize_keeps_input_and_pre_call_version() {
    let harness = Harness::new();
    harness.gateway.push_failure("overloaded");
    let mut page = page(&harness);
    let mut notices = NoticeSpy::default();
    page.set_input("keep me");

    page.optimize(Provider::Claude, &mut notices)
        .expect_err("gateway failure should propagate");

    assert_eq!(page.input(), "keep me");
    assert_eq!(page.history().versions(), ["keep me"]);
    assert_eq!(notices.messages(), vec!["Claude error: overloaded"]);
}

#[test]
fn undo_restore_and_listing_follow_cursor() {
    let harness = Harness {
        store: Arc::new(MemoryStore::with_entries([(
            CHAT_VERSIONS_KEY,
            r#"["a","b","c"]"#,
        )])),
        ..Harness::new()
    };
    let mut page = page(&harness);
    let mut notices = NoticeSpy::default();
    assert_eq!(page.input(), "c");

    assert_eq!(page.undo(&mut notices), Ok("b"));
    assert_eq!(page.input(), "b");
    assert_eq!(page.restore(0, &mut notices), Ok("a"));
    assert_eq!(page.undo(&mut notices), Err(ForgeError::NothingToUndo));
    assert_eq!(
        page.restore(5, &mut notices),
        Err(ForgeError::IndexOutOfRange { index: 5, len: 3 })
    );
    assert_eq!(page.input(), "a");

    let listing: Vec<(String, bool)> = page
        .versions()
        .iter()
        .map(|entry| (entry.label(), entry.is_current))
        .collect();
    assert_eq!(
        listing,
        vec![
            ("Version 3 (latest)".to_string(), false),
            ("Version 2".to_string(), false),
            ("Version 1".to_string(), true),
        ]
    );
    assert_eq!(notices.last().kind, NoticeKind::Error);
}

#[test]
fn corrupt_history_starts_empty() {
    let harness = Harness {
        store: Arc::new(MemoryStore::with_entries([(CHAT_VERSIONS_KEY, "{broken")])),
        ..Harness::new()
    };

    let page = page(&harness);

    assert!(page.history().is_empty());
    assert_eq!(page.input(), "");
}

#[test]
fn clear_history_wipes_versions_and_storage() {
    let harness = Harness {
        store: Arc::new(MemoryStore::with_entries([(CHAT_VERSIONS_KEY, r#"["x"]"#)])),
        ..Harness::new()
    };
    let mut page = page(&harness);
    let mut notices = NoticeSpy::default();

    page.clear_history(&mut notices);

    assert!(page.versions().is_empty());
    assert_eq!(harness.store.get(CHAT_VERSIONS_KEY).expect("get"), None);
    assert_eq!(notices.messages(), vec![HISTORY_CLEARED_MESSAGE]);
}
