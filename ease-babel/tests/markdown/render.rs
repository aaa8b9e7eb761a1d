//! Markdown → HTML rendering as the rich view receives it.

use crate::common::load;
use ease_babel::common::languages::{normalize_code_language, supported_languages, PLAINTEXT};
use ease_babel::document::Node;
use ease_babel::formats::markdown::parser::{markdown_to_html, render, LoadContext, RenderOptions};

#[test]
fn author_html_is_shown_as_text() {
    let doc = load("<script>alert(1)</script>\n\nhello <span>there</span>\n");
    assert_eq!(
        doc.children,
        vec![
            Node::paragraph(vec![Node::text("<script>alert(1)</script>")]),
            Node::paragraph(vec![Node::text("hello <span>there</span>")]),
        ]
    );
}

#[test]
fn script_urls_never_reach_the_view() {
    let html = render(
        "[a](javascript:alert(1)) ![b](vbscript:x) [c](file:///etc/passwd)\n",
        &RenderOptions::default(),
    );
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("vbscript:"));
    assert!(!html.contains("file:///etc/passwd"));
}

#[test]
fn unsupported_language_is_plaintext_but_tag_survives() {
    let doc = load("```brainfudge\n+++\n```\n");
    assert_eq!(
        doc.children,
        vec![Node::CodeBlock {
            language: Some("brainfudge".to_string()),
            code: "+++".to_string(),
        }]
    );
    let html = markdown_to_html("```brainfudge\n+++\n```\n", &LoadContext::default());
    assert!(html.contains("class=\"language-plaintext\""));
    assert_eq!(normalize_code_language("brainfudge"), PLAINTEXT);
}

#[test]
fn language_tags_are_lowercased() {
    let doc = load("```Python extra words\nx = 1\n```\n");
    assert_eq!(
        doc.children,
        vec![Node::CodeBlock {
            language: Some("python".to_string()),
            code: "x = 1".to_string(),
        }]
    );
}

#[test]
fn supported_languages_start_with_plaintext() {
    let languages = supported_languages();
    assert_eq!(languages[0], PLAINTEXT);
    assert!(languages.iter().any(|l| l == "rust"));
    assert!(languages[1..].windows(2).all(|w| w[0] < w[1]));
    assert_eq!(normalize_code_language(" RS "), "rs");
}

#[test]
fn render_options_are_honored() {
    let off = RenderOptions {
        typographer: false,
        soft_breaks_as_line_breaks: false,
        linkify: false,
    };
    let html = render("\"q\" https://example.com\nnext\n", &off);
    assert_eq!(html, "<p>&quot;q&quot; https://example.com\nnext</p>\n");

    let on = render("\"q\" https://example.com\nnext\n", &RenderOptions::default());
    assert!(on.contains("\u{201c}q\u{201d}"));
    assert!(on.contains("<a href=\"https://example.com\">"));
    assert!(on.contains("<br />"));
}

#[test]
fn leading_indentation_survives_in_text() {
    let doc = load("<div>\n  <p>x</p>\n</div>\n");
    let Node::Paragraph { children } = &doc.children[0] else {
        panic!("expected a paragraph, got {:?}", doc.children);
    };
    assert_eq!(children[1], Node::HardBreak);
    assert_eq!(children[2], Node::text("\u{a0}\u{a0}<p>x</p>"));
    assert!(crate::common::to_markdown("<div>\n  <p>x</p>\n</div>\n").contains("\n  <p>x</p>"));
}

#[test]
fn rendering_is_deterministic() {
    let source = crate::common::fixture("kitchensink.md");
    let options = RenderOptions::default();
    assert_eq!(render(&source, &options), render(&source, &options));
}
