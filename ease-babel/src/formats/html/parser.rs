//! HTML parsing (HTML → structured document)
//!
//! Builds a [`Document`] from rendered HTML the way a rich-text editor's
//! schema would: block elements map to block nodes, everything else becomes
//! marked inline content, and stray inline content at block level is wrapped
//! in a paragraph.

use crate::common::dom;
use crate::common::languages::PLAINTEXT;
use crate::document::{sort_marks, Align, Document, Image, Mark, Node};
use markup5ever_rcdom::{Handle, NodeData};

/// Parse HTML into a document. Never fails; unknown markup degrades to text.
pub fn document_from_html(html: &str) -> Document {
    let dom = dom::parse_html(html);
    let Some(body) = dom::body(&dom) else {
        return Document::default();
    };
    let children: Vec<Handle> = body.children.borrow().iter().cloned().collect();
    Document::new(parse_blocks(&children))
}

fn is_container(tag: &str) -> bool {
    matches!(
        tag,
        "div" | "section" | "article" | "main" | "header" | "footer" | "aside" | "nav" | "figure"
    )
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn is_block(tag: &str) -> bool {
    heading_level(tag).is_some()
        || is_container(tag)
        || matches!(
            tag,
            "p" | "pre" | "ul" | "ol" | "li" | "blockquote" | "hr" | "table"
        )
}

/// Parse a sequence of sibling nodes at block level.
fn parse_blocks(children: &[Handle]) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut pending = Vec::new();

    for child in children {
        let tag = dom::tag_name(child);
        match tag.as_deref() {
            Some(tag) if is_block(tag) => {
                flush_paragraph(&mut pending, &mut blocks);
                parse_block(child, tag, &mut blocks);
            }
            _ => parse_inline(child, &[], &mut pending),
        }
    }
    flush_paragraph(&mut pending, &mut blocks);
    blocks
}

fn flush_paragraph(pending: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    let inline = normalize_inline(std::mem::take(pending));
    if !inline.is_empty() {
        blocks.push(Node::paragraph(inline));
    }
}

fn child_handles(handle: &Handle) -> Vec<Handle> {
    handle.children.borrow().iter().cloned().collect()
}

fn parse_block(handle: &Handle, tag: &str, blocks: &mut Vec<Node>) {
    if let Some(level) = heading_level(tag) {
        blocks.push(Node::heading(level, inline_content(handle)));
        return;
    }
    match tag {
        "p" => {
            let inline = inline_content(handle);
            if !inline.is_empty() {
                blocks.push(Node::paragraph(inline));
            }
        }
        "pre" => blocks.push(parse_code_block(handle)),
        "ul" | "ol" => blocks.push(parse_list(handle, tag == "ol")),
        "li" => blocks.push(Node::ListItem {
            children: parse_blocks(&child_handles(handle)),
        }),
        "blockquote" => blocks.push(Node::Blockquote {
            children: parse_blocks(&child_handles(handle)),
        }),
        "hr" => blocks.push(Node::HorizontalRule),
        "table" => blocks.push(parse_table(handle)),
        _ => blocks.extend(parse_blocks(&child_handles(handle))),
    }
}

fn inline_content(handle: &Handle) -> Vec<Node> {
    let mut out = Vec::new();
    for child in child_handles(handle) {
        parse_inline(&child, &[], &mut out);
    }
    normalize_inline(out)
}

/// Language declared on a `<pre>`/`<code>` pair.
///
/// `data-language` on the `<pre>` wins; otherwise a `language-*` or `lang-*`
/// class on the `<code>`. `plaintext` means no language.
pub fn code_language(pre: &Handle, code: Option<&Handle>) -> Option<String> {
    let declared = dom::attr(pre, "data-language")
        .filter(|l| !l.trim().is_empty())
        .or_else(|| code.and_then(language_from_class));
    declared
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty() && l != PLAINTEXT)
}

fn language_from_class(code: &Handle) -> Option<String> {
    dom::classes(code).into_iter().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    })
}

fn parse_code_block(pre: &Handle) -> Node {
    let code = dom::element_children(pre)
        .into_iter()
        .next()
        .filter(|first| dom::is_element(first, "code"));
    let language = code_language(pre, code.as_ref());
    let mut text = dom::text_content(code.as_ref().unwrap_or(pre));
    if text.ends_with('\n') {
        text.pop();
    }
    Node::CodeBlock {
        language,
        code: text,
    }
}

fn parse_list(handle: &Handle, ordered: bool) -> Node {
    let start = dom::attr(handle, "start")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(1);
    let items = dom::element_children(handle)
        .iter()
        .map(|item| Node::ListItem {
            children: parse_blocks(&child_handles(item)),
        })
        .collect();
    Node::List {
        ordered,
        start,
        items,
    }
}

fn parse_table(table: &Handle) -> Node {
    let mut rows = Vec::new();
    collect_rows(table, &mut rows);
    Node::Table { rows }
}

fn collect_rows(handle: &Handle, rows: &mut Vec<Node>) {
    for child in dom::element_children(handle) {
        match dom::tag_name(&child).as_deref() {
            Some("thead" | "tbody" | "tfoot") => collect_rows(&child, rows),
            Some("tr") => {
                let cells = dom::element_children(&child)
                    .iter()
                    .filter(|cell| dom::is_element(cell, "th") || dom::is_element(cell, "td"))
                    .map(|cell| Node::TableCell {
                        header: dom::is_element(cell, "th"),
                        align: cell_align(cell),
                        children: inline_content(cell),
                    })
                    .collect();
                rows.push(Node::TableRow { cells });
            }
            _ => {}
        }
    }
}

pub(crate) fn cell_align(cell: &Handle) -> Align {
    if let Some(align) = dom::attr(cell, "align") {
        return Align::from_attr(Some(&align));
    }
    let style = dom::attr(cell, "style").unwrap_or_default();
    let value = style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        (key.trim() == "text-align").then(|| value.trim().to_string())
    });
    Align::from_attr(value.as_deref())
}

/// Parse inline content under `handle`, carrying the marks of its ancestors.
fn parse_inline(handle: &Handle, marks: &[Mark], out: &mut Vec<Node>) {
    match &handle.data {
        NodeData::Text { contents } => {
            let text = contents.borrow();
            push_text(&text, marks, out);
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.to_string();
            let mark = match tag.as_str() {
                "strong" | "b" => Some(Mark::Bold),
                "em" | "i" => Some(Mark::Italic),
                "s" | "del" | "strike" => Some(Mark::Strike),
                "code" => Some(Mark::Code),
                "a" => Some(Mark::Link {
                    href: dom::attr(handle, "href").unwrap_or_default(),
                    title: dom::attr(handle, "title").filter(|t| !t.is_empty()),
                }),
                "br" => {
                    out.push(Node::HardBreak);
                    return;
                }
                "img" => {
                    out.push(Node::Image(parse_image(handle)));
                    return;
                }
                _ => None,
            };
            let mut inner = marks.to_vec();
            if let Some(mark) = mark {
                inner.push(mark);
                sort_marks(&mut inner);
            }
            for child in child_handles(handle) {
                parse_inline(&child, &inner, out);
            }
        }
        _ => {}
    }
}

fn parse_image(handle: &Handle) -> Image {
    Image {
        src: dom::attr(handle, "src").unwrap_or_default(),
        original: dom::attr(handle, "data-original").filter(|o| !o.is_empty()),
        alt: dom::attr(handle, "alt").unwrap_or_default(),
        title: dom::attr(handle, "title").filter(|t| !t.is_empty()),
    }
}

/// Collapse runs of ASCII whitespace to a single space. U+00A0 is kept.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn push_text(text: &str, marks: &[Mark], out: &mut Vec<Node>) {
    let is_code = marks.contains(&Mark::Code);
    let mut text = if is_code {
        text.replace('\n', " ")
    } else {
        collapse_whitespace(text)
    };
    if !is_code && text.starts_with(' ') && ends_with_space(out) {
        text.remove(0);
    }
    if text.is_empty() {
        return;
    }
    out.push(Node::Text {
        text,
        marks: marks.to_vec(),
    });
}

fn ends_with_space(out: &[Node]) -> bool {
    match out.last() {
        Some(Node::Text { text, .. }) => text.ends_with(' '),
        Some(Node::HardBreak) | None => true,
        Some(_) => false,
    }
}

/// Merge adjacent same-mark text and trim whitespace at line edges.
fn normalize_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (
            Some(Node::Text { text, marks }),
            Node::Text {
                text: next,
                marks: next_marks,
            },
        ) = (merged.last_mut(), &node)
        {
            if marks == next_marks {
                text.push_str(next);
                continue;
            }
        }
        merged.push(node);
    }

    let len = merged.len();
    for index in 0..len {
        let at_line_start = index == 0 || matches!(merged[index - 1], Node::HardBreak);
        let at_line_end = index + 1 == len || matches!(merged[index + 1], Node::HardBreak);
        if let Node::Text { text, .. } = &mut merged[index] {
            if at_line_start {
                *text = text.trim_start_matches(' ').to_string();
            }
            if at_line_end {
                *text = text.trim_end_matches(' ').to_string();
            }
        }
    }

    merged.retain(|node| !matches!(node, Node::Text { text, .. } if text.is_empty()));
    merged
}
