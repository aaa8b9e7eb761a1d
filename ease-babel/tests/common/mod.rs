//! Shared helpers for the integration tests.

use ease_babel::formats::markdown::parser::{load_document, LoadContext};
use ease_babel::formats::markdown::serializer::serialize;
use ease_babel::Document;
use std::path::PathBuf;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

/// Load Markdown with default options and no document path.
pub fn load(markdown: &str) -> Document {
    load_document(markdown, &LoadContext::default())
}

/// Markdown → Document → Markdown with default options.
pub fn to_markdown(markdown: &str) -> String {
    serialize(&load(markdown))
}

/// render → from_html → serialize → render → from_html yields the same document.
pub fn assert_round_trip(markdown: &str, context: &LoadContext) {
    let first = load_document(markdown, context);
    let written = serialize(&first);
    let second = load_document(&written, context);
    assert_eq!(
        first, second,
        "document changed after a save/load cycle\n--- source ---\n{markdown}\n--- written ---\n{written}"
    );
}
