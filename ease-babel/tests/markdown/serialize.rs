//! Document → Markdown, checked on documents built by hand and loaded ones.

use crate::common::to_markdown;
use ease_babel::document::{Align, Document, Image, Mark, Node};
use ease_babel::formats::markdown::serializer::serialize;
use ease_babel::formats::markdown::style::{HeadingStyle, StyleRules};
use ease_babel::formats::markdown::MarkdownFormat;
use ease_babel::Format;
use insta::assert_snapshot;

fn cell(header: bool, align: Align, text: &str) -> Node {
    Node::TableCell {
        header,
        align,
        children: vec![Node::text(text)],
    }
}

#[test]
fn hand_built_document() {
    let doc = Document::new(vec![
        Node::heading(1, vec![Node::text("Notes")]),
        Node::paragraph(vec![
            Node::text("Read "),
            Node::marked_text(
                "the docs",
                vec![Mark::Link {
                    href: "https://example.com/a b".to_string(),
                    title: None,
                }],
            ),
            Node::text(" and "),
            Node::marked_text("ship", vec![Mark::Italic, Mark::Bold]),
            Node::text("."),
        ]),
        Node::CodeBlock {
            language: Some("toml".to_string()),
            code: "[package]\nname = \"x\"".to_string(),
        },
        Node::paragraph(vec![Node::Image(Image {
            src: "data:image/png;base64,AAAA".to_string(),
            original: Some("assets/shot.png".to_string()),
            alt: "shot".to_string(),
            title: None,
        })]),
        Node::Table {
            rows: vec![
                Node::TableRow {
                    cells: vec![cell(true, Align::Center, "k"), cell(true, Align::None, "v")],
                },
                Node::TableRow {
                    cells: vec![cell(false, Align::Center, "a"), cell(false, Align::None, "b")],
                },
            ],
        },
    ]);

    assert_snapshot!(serialize(&doc), @r###"
    # Notes

    Read [the docs](<https://example.com/a b>) and **_ship_**.

    ```toml
    [package]
    name = "x"
    ```

    ![shot](assets/shot.png)

    | k | v |
    | :---: | --- |
    | a | b |
    "###);
}

#[test]
fn loaded_document_is_written_in_canonical_style() {
    let source = "Title\n=====\n\n* one\n* two\n\n__strong__ and *em*\n\n***\n";
    assert_snapshot!(to_markdown(source), @r###"
    # Title

    - one
    - two

    **strong** and _em_

    ---
    "###);
}

#[test]
fn spaces_after_inline_spans_stay_plain() {
    let written = to_markdown("**a** b _c_ d `e` f [g](h) i ~~j~~ k\n");
    assert_eq!(written, "**a** b _c_ d `e` f [g](h) i ~~j~~ k\n");
    assert!(!written.contains('\u{a0}'));
}

#[test]
fn escaped_references_and_hashes_survive_saving() {
    assert_eq!(to_markdown("Write &amp;nbsp; here\n"), "Write \\&nbsp; here\n");
    assert_eq!(to_markdown("# foo \\#\n"), "# foo \\#\n");
}

#[test]
fn empty_document_serializes_to_nothing() {
    assert_eq!(serialize(&Document::default()), "");
    assert_eq!(to_markdown("\n\n   \n"), "");
}

#[test]
fn markdown_format_applies_style_rules() {
    let format = MarkdownFormat {
        rules: StyleRules {
            heading_style: HeadingStyle::Setext,
            ..StyleRules::default()
        },
        ..MarkdownFormat::default()
    };
    let doc = format.parse("# Title\n\ntext\n").unwrap();
    assert_eq!(format.serialize(&doc).unwrap(), "Title\n=====\n\ntext\n");
}
