//! Save/load cycles: a document written to Markdown and loaded again must not
//! change, and writing it a second time must give the same text.

use crate::common::{assert_round_trip, fixture, load, to_markdown};
use ease_babel::document::{Image, Node};
use ease_babel::formats::markdown::parser::{load_document, LoadContext};
use ease_babel::formats::markdown::serializer::serialize;
use proptest::prelude::*;

const CORPUS: &[&str] = &[
    "# Title\n\n## Sub\n\n###### Deep\n",
    "- a\n- b\n  - c\n    - d\n- e\n",
    "1. one\n2. two\n   1. nested\n",
    "5. starts at five\n6. six\n",
    "- loose\n\n- items\n",
    "```rust\nfn main() {\n    let x = 1;\n}\n```\n",
    "```klingon\nnuqneH\n```\n",
    "````\ncode with ``` inside\n````\n",
    "![alt text](images/pic.png)\n",
    "![](../shared/a%20b.png \"Title\")\n",
    "| a | b |\n| :-- | --: |\n| 1 | 2 |\n",
    "**bold** _italic_ ~~strike~~ `code` ***both***\n",
    "[link](https://example.com \"T\") and <https://example.org>\n",
    "> quote\n>\n> - list in quote\n",
    "first line\nsecond line\n",
    "Use \\*literal\\* stars and \\[brackets\\].\n",
    "text\n\n---\n\nmore\n",
    "Write &amp;nbsp; for a space\n",
    "&amp;copy; and &amp;lt; and &amp;#35; stay literal, AT&T too\n",
    "# foo \\#\n",
    "## Ends with ##\n",
];

#[test]
fn corpus_round_trips() {
    for source in CORPUS {
        assert_round_trip(source, &LoadContext::default());
    }
}

#[test]
fn kitchensink_round_trips() {
    assert_round_trip(&fixture("kitchensink.md"), &LoadContext::default());
}

#[test]
fn serialization_is_stable() {
    let once = to_markdown(&fixture("kitchensink.md"));
    let twice = to_markdown(&once);
    assert_eq!(once, twice);
}

#[test]
fn kitchensink_keeps_languages_and_sources() {
    let written = to_markdown(&fixture("kitchensink.md"));
    assert!(written.contains("```rust\nfn main() {\n    println!(\"hello\");\n}\n```"));
    assert!(written.contains("```klingon\nnuqneH\n```"));
    assert!(written.contains("```\nuntagged block\n```"));
    assert!(written.contains("![Diagram](images/diagram.png \"Overview\")"));
    assert!(written.contains("| :--- | :---: | ---: |"));
    assert!(written.contains("<https://example.org>"));
}

#[test]
fn local_image_is_displayed_inline_and_written_back_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets").join("pic.png"), [0x89, b'P', b'N', b'G']).unwrap();
    let context = LoadContext::for_path(Some(dir.path().join("note.md")));

    let source = "Before\n\n![pic](assets/pic.png)\n";
    let doc = load_document(source, &context);
    let images = doc.images();
    assert_eq!(images.len(), 1);
    let (_, image) = images[0];
    assert!(image.src.starts_with("data:image/png;base64,"));
    assert_eq!(image.original.as_deref(), Some("assets/pic.png"));

    assert_eq!(serialize(&doc), "Before\n\n![pic](assets/pic.png)\n");
    assert_round_trip(source, &context);
}

#[test]
fn remote_image_passes_through() {
    let doc = load("![x](https://example.com/x.png)\n");
    assert_eq!(
        doc.children,
        vec![Node::paragraph(vec![Node::Image(Image {
            src: "https://example.com/x.png".to_string(),
            original: None,
            alt: "x".to_string(),
            title: None,
        })])]
    );
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

proptest! {
    #[test]
    fn headings_paragraphs_and_lists_round_trip(
        level in 1usize..=6,
        title in prop::collection::vec(word(), 1..4),
        body in prop::collection::vec(word(), 1..12),
        items in prop::collection::vec(word(), 0..5),
    ) {
        let mut source = format!("{} {}\n\n{}\n", "#".repeat(level), title.join(" "), body.join(" "));
        if !items.is_empty() {
            source.push('\n');
            for item in &items {
                source.push_str(&format!("- {item}\n"));
            }
        }

        let first = load(&source);
        let second = load(&serialize(&first));
        prop_assert_eq!(first, second);
    }
}
