//! Document → HTML, the representation the Markdown serializer walks.

use ease_babel::document::{Document, Image, Node};
use ease_babel::formats::html::HtmlFormat;
use ease_babel::Format;
use insta::assert_snapshot;

#[test]
fn editor_attributes_are_written() {
    let doc = Document::new(vec![
        Node::CodeBlock {
            language: Some("python".to_string()),
            code: "x = 1 < 2".to_string(),
        },
        Node::paragraph(vec![Node::Image(Image {
            src: "data:image/png;base64,AA".to_string(),
            original: Some("a.png".to_string()),
            alt: "a".to_string(),
            title: None,
        })]),
        Node::List {
            ordered: true,
            start: 2,
            items: vec![Node::ListItem {
                children: vec![Node::paragraph(vec![Node::text("two")])],
            }],
        },
    ]);
    assert_snapshot!(HtmlFormat.serialize(&doc).unwrap(), @r###"<pre data-language="python"><code class="language-python">x = 1 &lt; 2</code></pre><p><img src="data:image/png;base64,AA" alt="a" data-original="a.png"></p><ol start="2"><li><p>two</p></li></ol>"###);
}

#[test]
fn html_format_round_trips_documents() {
    let doc = HtmlFormat
        .parse("<h1>T</h1><ul><li><p>a</p><ul><li><p>b</p></li></ul></li></ul><hr><blockquote><p>q</p></blockquote>")
        .unwrap();
    let again = HtmlFormat.parse(&HtmlFormat.serialize(&doc).unwrap()).unwrap();
    assert_eq!(doc, again);
}
