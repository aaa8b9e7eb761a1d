//! A draft is never lost silently: the user is always asked, and saying no
//! keeps both the file text and the draft.

use crate::common::{session, write};
use ease_session::drafts::{self, draft_key};
use ease_session::session::{RESTORE_DRAFT_PROMPT, STATUS_DRAFT_RESTORED, STATUS_LOADED};
use ease_session::{KeyValueStore, MemoryStore};
use std::time::{Duration, Instant};

fn store_with_draft(path: Option<&std::path::Path>, text: &str) -> MemoryStore {
    let mut store = MemoryStore::new();
    drafts::save(&mut store, &draft_key(path), text, 1).unwrap();
    store
}

#[test]
fn accepting_restores_the_draft() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "# Saved\n");

    let mut s = session(store_with_draft(Some(&path), "# Draft\n"), &[true]);
    assert!(s.open_path(&path, false));

    assert_eq!(s.host().prompts, vec![RESTORE_DRAFT_PROMPT]);
    assert!(s.content().contains("Draft"));
    assert!(s.is_dirty());
    assert_eq!(s.status(), STATUS_DRAFT_RESTORED);
    assert_eq!(s.outline()[0].text, "Draft");
}

#[test]
fn rejecting_keeps_file_text_and_draft() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "# Saved\n");

    let mut s = session(store_with_draft(Some(&path), "# Draft\n"), &[false]);
    assert!(s.open_path(&path, false));

    assert_eq!(s.host().prompts, vec![RESTORE_DRAFT_PROMPT]);
    assert!(s.content().contains("Saved"));
    assert!(!s.is_dirty());
    assert_eq!(s.status(), STATUS_LOADED);
    assert!(drafts::load(s.store(), &draft_key(Some(&path))).is_some());
}

#[test]
fn identical_or_blank_drafts_are_not_offered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "# Saved\n");

    let mut s = session(store_with_draft(Some(&path), "# Saved\n"), &[true]);
    s.open_path(&path, false);
    assert!(s.host().prompts.is_empty());

    let mut store = MemoryStore::new();
    store
        .set(&draft_key(Some(&path)), r#"{"text":"  \n","updatedAt":1}"#)
        .unwrap();
    let mut s = session(store, &[true]);
    s.open_path(&path, false);
    assert!(s.host().prompts.is_empty());
}

#[test]
fn untitled_draft_is_offered_on_new_file() {
    let mut s = session(store_with_draft(None, "scratch notes"), &[true]);
    assert!(s.new_file_with_prompt());
    assert_eq!(s.host().prompts, vec![RESTORE_DRAFT_PROMPT]);
    assert!(s.content().contains("scratch notes"));
    assert!(s.is_dirty());
}

#[test]
fn edits_are_saved_as_draft_after_the_delay() {
    let mut s = session(MemoryStore::new(), &[]);
    s.set_source_mode(true);
    s.edit_source("unsaved words");

    s.tick(Instant::now());
    assert!(drafts::load(s.store(), &draft_key(None)).is_none());

    s.tick(Instant::now() + Duration::from_secs(5));
    let draft = drafts::load(s.store(), &draft_key(None)).unwrap();
    assert_eq!(draft.text, "unsaved words");
    assert_eq!(s.status(), "Draft saved");
}

#[test]
fn teardown_flushes_pending_draft() {
    let mut s = session(MemoryStore::new(), &[]);
    s.set_source_mode(true);
    s.edit_source("last words");
    let store = s.teardown();
    assert_eq!(drafts::load(&store, &draft_key(None)).unwrap().text, "last words");
}

#[test]
fn disabled_autosave_writes_nothing() {
    let mut s = session(MemoryStore::new(), &[]);
    let prefs = ease_config::Preferences {
        autosave_drafts: false,
        ..ease_config::Preferences::default()
    };
    s.set_preferences(prefs).unwrap();
    s.set_source_mode(true);
    s.edit_source("text");
    let store = s.teardown();
    assert!(drafts::load(&store, &draft_key(None)).is_none());
}

#[test]
fn saving_clears_the_draft() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "old\n");

    let mut s = session(MemoryStore::new(), &[]);
    s.open_path(&path, false);
    s.set_source_mode(true);
    s.edit_source("new\n");
    s.tick(Instant::now() + Duration::from_secs(5));
    assert!(drafts::load(s.store(), &draft_key(Some(&path))).is_some());

    assert!(s.save());
    assert!(drafts::load(s.store(), &draft_key(Some(&path))).is_none());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
}
