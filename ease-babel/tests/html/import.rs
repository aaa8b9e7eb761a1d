//! HTML → Document, for markup the renderer never produces itself.

use ease_babel::document::{Align, Document, Mark, Node};

#[test]
fn pasted_markup_is_normalized() {
    let doc = Document::from_html(
        "<div><section>loose <b>bold</b>   text</section><p>  </p>\
         <h2>  Spaced   title </h2></div>",
    );
    assert_eq!(
        doc.children,
        vec![
            Node::paragraph(vec![
                Node::text("loose "),
                Node::marked_text("bold", vec![Mark::Bold]),
                Node::text(" text"),
            ]),
            Node::heading(2, vec![Node::text("Spaced title")]),
        ]
    );
}

#[test]
fn code_language_sources() {
    let doc = Document::from_html(
        "<pre data-language=\"Go\"><code class=\"language-rust\">a</code></pre>\
         <pre><code class=\"lang-sh\">b</code></pre>\
         <pre><code class=\"language-plaintext\">c</code></pre>",
    );
    let languages: Vec<Option<String>> = doc
        .children
        .iter()
        .map(|node| match node {
            Node::CodeBlock { language, .. } => language.clone(),
            other => panic!("expected code block, got {other:?}"),
        })
        .collect();
    assert_eq!(
        languages,
        vec![Some("go".to_string()), Some("sh".to_string()), None]
    );
}

#[test]
fn table_alignment_from_style() {
    let doc = Document::from_html(
        "<table><tr><th style=\"text-align: right\">n</th></tr><tr><td>1</td></tr></table>",
    );
    let Node::Table { rows } = &doc.children[0] else {
        panic!("expected table");
    };
    assert_eq!(
        rows[0],
        Node::TableRow {
            cells: vec![Node::TableCell {
                header: true,
                align: Align::Right,
                children: vec![Node::text("n")],
            }],
        }
    );
}

#[test]
fn nbsp_is_not_collapsed() {
    let doc = Document::from_html("<p>a\u{a0}\u{a0} b</p>");
    assert_eq!(doc.children, vec![Node::paragraph(vec![Node::text("a\u{a0}\u{a0} b")])]);
}
