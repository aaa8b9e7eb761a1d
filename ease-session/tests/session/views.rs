use crate::common::{session, write};
use ease_babel::{Document, Locator, Node, NodePath};
use ease_session::MemoryStore;
use std::time::{Duration, Instant};

fn outline_summary(s: &ease_session::Session<MemoryStore, crate::common::ScriptedHost>) -> Vec<(u8, String)> {
    s.outline().iter().map(|e| (e.level, e.text.clone())).collect()
}

#[test]
fn switching_views_carries_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "# Title\n\nBody text\n");

    let mut s = session(MemoryStore::new(), &[]);
    s.open_path(&path, false);
    let rich = s.content();

    s.set_source_mode(true);
    assert!(s.is_source_mode());
    assert_eq!(s.content(), rich);
    assert_eq!(s.outline()[0].locator, Locator::Line(0));

    s.edit_source("## Changed\n\nother words here\n");
    assert_eq!(s.word_count(), 5);
    s.toggle_source_mode();
    assert!(!s.is_source_mode());
    assert_eq!(outline_summary(&s), vec![(2, "Changed".to_string())]);
    assert_eq!(s.outline()[0].locator, Locator::Node(NodePath(vec![0])));
    assert!(s.content().starts_with("## Changed"));
}

#[test]
fn setting_the_same_mode_is_a_no_op() {
    let mut s = session(MemoryStore::new(), &[]);
    s.set_source_mode(true);
    s.edit_source("# Kept\n");
    s.set_source_mode(true);
    assert_eq!(s.content(), "# Kept\n");
}

#[test]
fn outline_follows_edits_after_the_delay() {
    let mut s = session(MemoryStore::new(), &[]);
    s.edit_document(Document::new(vec![Node::heading(1, vec![Node::text("Fresh")])]));
    assert!(s.is_dirty());
    assert!(s.outline().is_empty());
    assert!(s.next_deadline().is_some());

    s.tick(Instant::now() + Duration::from_secs(5));
    assert_eq!(outline_summary(&s), vec![(1, "Fresh".to_string())]);
    assert_eq!(s.next_deadline(), None);
}

#[test]
fn stale_render_results_are_dropped() {
    let mut s = session(MemoryStore::new(), &[]);
    let older = s.begin_render();
    let newer = s.begin_render();

    assert!(s.complete_render(newer, "# New\n"));
    assert!(!s.complete_render(older, "# Old\n"));
    assert_eq!(outline_summary(&s), vec![(1, "New".to_string())]);
}
