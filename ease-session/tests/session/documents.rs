use crate::common::{session, write};
use ease_session::session::{
    SAVE_BEFORE_LEAVE_PROMPT, STATUS_NEW_FILE, STATUS_OPEN_FAILED, STATUS_SAVED,
};
use ease_session::tree::EntryKind;
use ease_session::{JsonFileStore, MemoryStore, Session};
use std::path::PathBuf;

#[test]
fn open_sets_path_recents_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.md");
    let b = dir.path().join("b.md");
    write(&a, "# A\n\none two three\n");
    write(&b, "# B\n");

    let mut s = session(MemoryStore::new(), &[]);
    assert!(s.open_path(&a, true));
    assert_eq!(s.current_path(), Some(a.as_path()));
    assert_eq!(s.word_count(), 4);
    assert!(s.open_path(&b, true));

    assert_eq!(s.recent_files(), vec![b.clone(), a.clone()]);
    assert_eq!(s.host().recents.last(), Some(&vec![b, a]));
    assert_eq!(s.status(), "Loaded file");
}

#[test]
fn failed_open_leaves_document_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(MemoryStore::new(), &[]);
    s.set_source_mode(true);
    s.edit_source("keep me");

    assert!(!s.open_path(dir.path().join("missing.md"), false));
    assert_eq!(s.status(), STATUS_OPEN_FAILED);
    assert_eq!(s.current_path(), None);
    assert_eq!(s.content(), "keep me");
    assert!(s.is_dirty());
}

#[test]
fn dirty_document_is_saved_when_user_agrees() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "before\n");

    let mut s = session(MemoryStore::new(), &[true]);
    s.open_path(&path, true);
    s.set_source_mode(true);
    s.edit_source("after\n");

    assert!(s.new_file_with_prompt());
    assert_eq!(s.host().prompts, vec![SAVE_BEFORE_LEAVE_PROMPT]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "after\n");
    assert_eq!(s.current_path(), None);
    assert_eq!(s.status(), STATUS_NEW_FILE);
}

#[test]
fn dirty_document_is_discarded_when_user_declines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "before\n");

    let mut s = session(MemoryStore::new(), &[false]);
    s.open_path(&path, true);
    s.set_source_mode(true);
    s.edit_source("after\n");

    assert!(s.new_file_with_prompt());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "before\n");
    assert!(!s.is_dirty());
}

#[test]
fn leaving_is_aborted_when_save_is_cancelled() {
    let mut s = session(MemoryStore::new(), &[true]);
    s.set_source_mode(true);
    s.edit_source("untitled work");

    // No save path from the host: save-as is cancelled.
    assert!(!s.new_file_with_prompt());
    assert_eq!(s.content(), "untitled work");
    assert!(s.is_dirty());
}

#[test]
fn save_as_adopts_path_and_folder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.md");

    let mut s = session(MemoryStore::new(), &[]);
    s.host_mut().save_path = Some(path.clone());
    s.set_source_mode(true);
    s.edit_source("# Hello\n");

    assert!(s.save());
    assert_eq!(s.current_path(), Some(path.as_path()));
    assert_eq!(s.folder(), Some(dir.path()));
    assert_eq!(s.status(), STATUS_SAVED);
    assert!(!s.is_dirty());
    assert_eq!(s.recent_files(), vec![path.clone()]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Hello\n");
}

#[test]
fn crlf_preference_applies_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("win.md");

    let mut s = session(MemoryStore::new(), &[]);
    s.set_preferences(ease_config::Preferences {
        newline_style: ease_babel::formats::markdown::style::NewlineStyle::Crlf,
        ..ease_config::Preferences::default()
    })
    .unwrap();
    s.set_source_mode(true);
    s.edit_source("a\nb\n");
    assert!(s.save_as(Some(path.clone())));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\r\nb\r\n");
}

#[test]
fn folder_tree_includes_created_folders() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("note.md"), "x");

    let mut s = session(MemoryStore::new(), &[]);
    assert!(s.folder_tree().is_empty());
    s.set_folder(Some(dir.path().to_path_buf()));
    let created = s.create_folder(dir.path(), "drafts").unwrap();
    assert!(created.is_dir());

    let tree = s.folder_tree();
    let summary: Vec<(&str, EntryKind)> = tree.iter().map(|e| (e.name.as_str(), e.kind)).collect();
    assert_eq!(
        summary,
        vec![("drafts", EntryKind::Directory), ("note.md", EntryKind::File)]
    );
}

#[test]
fn json_file_store_survives_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state").join("store.json");
    let doc = dir.path().join("doc.md");
    write(&doc, "text\n");

    let mut s = Session::init(
        JsonFileStore::open(&store_path).unwrap(),
        crate::common::ScriptedHost::default(),
    );
    s.open_path(&doc, false);
    drop(s.teardown());

    let reopened = Session::init(
        JsonFileStore::open(&store_path).unwrap(),
        crate::common::ScriptedHost::default(),
    );
    assert_eq!(reopened.recent_files(), vec![PathBuf::from(&doc)]);
}
