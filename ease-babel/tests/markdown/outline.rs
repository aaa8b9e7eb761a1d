//! Outline of the rich document and of the raw source must agree.

use crate::common::{fixture, load};
use ease_babel::document::NodePath;
use ease_babel::outline::{from_document, from_source, Locator, OutlineEntry};

#[test]
fn title_and_sub() {
    let entries = from_source("# Title\n\ntext\n## Sub\n");
    assert_eq!(
        entries,
        vec![
            OutlineEntry {
                level: 1,
                text: "Title".to_string(),
                locator: Locator::Line(0),
            },
            OutlineEntry {
                level: 2,
                text: "Sub".to_string(),
                locator: Locator::Line(3),
            },
        ]
    );
}

#[test]
fn document_and_source_outlines_agree() {
    let source = fixture("kitchensink.md");
    let from_doc: Vec<(u8, String)> = from_document(&load(&source))
        .into_iter()
        .map(|e| (e.level, e.text))
        .collect();
    let from_text: Vec<(u8, String)> = from_source(&source)
        .into_iter()
        .map(|e| (e.level, e.text))
        .collect();
    assert_eq!(from_doc, from_text);
    assert_eq!(from_doc.len(), 4);
}

#[test]
fn document_locators_point_at_headings() {
    let doc = load("intro\n\n# One\n\ntext\n\n## Two\n");
    let entries = from_document(&doc);
    assert_eq!(entries[0].locator, Locator::Node(NodePath(vec![1])));
    assert_eq!(entries[1].locator, Locator::Node(NodePath(vec![3])));
}

#[test]
fn outline_serializes_for_hosts() {
    let json = serde_json::to_string(&from_source("## Two\n")).unwrap();
    assert_eq!(json, r#"[{"level":2,"text":"Two","locator":{"line":0}}]"#);
}
