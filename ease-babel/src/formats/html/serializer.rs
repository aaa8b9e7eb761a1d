//! HTML serialization (structured document → HTML)
//!
//! Pipeline: Document → RcDom → HTML string. Marks shared by neighbouring
//! inline nodes stay open across them, so `**a *b***` serializes as one
//! `<strong>` instead of two adjacent ones.

use crate::common::dom::{append, create_element, create_text, serialize_children};
use crate::document::{Document, Image, Mark, Node};
use markup5ever_rcdom::Handle;

/// Serialize a document to an HTML fragment (no `<html>`/`<body>` wrapper).
pub fn document_to_html(doc: &Document) -> String {
    let container = create_element("div", vec![]);
    for node in &doc.children {
        append_block(&container, node);
    }
    serialize_children(&container)
}

fn append_block(parent: &Handle, node: &Node) {
    match node {
        Node::Heading { level, children } => {
            let heading = create_element(&format!("h{level}"), vec![]);
            append_inline(&heading, children);
            append(parent, heading);
        }
        Node::Paragraph { children } => {
            let para = create_element("p", vec![]);
            append_inline(&para, children);
            append(parent, para);
        }
        Node::CodeBlock { language, code } => {
            let (pre, code_el) = match language {
                Some(lang) => {
                    let class = format!("language-{lang}");
                    (
                        create_element("pre", vec![("data-language", lang.as_str())]),
                        create_element("code", vec![("class", class.as_str())]),
                    )
                }
                None => (create_element("pre", vec![]), create_element("code", vec![])),
            };
            append(&code_el, create_text(code));
            append(&pre, code_el);
            append(parent, pre);
        }
        Node::Image(image) => {
            let para = create_element("p", vec![]);
            append(&para, image_element(image));
            append(parent, para);
        }
        Node::Table { rows } => append(parent, table_element(rows)),
        Node::TableRow { .. } | Node::TableCell { .. } => {
            append(parent, table_element(std::slice::from_ref(node)))
        }
        Node::List {
            ordered,
            start,
            items,
        } => {
            let start_attr = start.to_string();
            let list = if *ordered {
                let attrs = if *start != 1 {
                    vec![("start", start_attr.as_str())]
                } else {
                    vec![]
                };
                create_element("ol", attrs)
            } else {
                create_element("ul", vec![])
            };
            for item in items {
                append_block(&list, item);
            }
            append(parent, list);
        }
        Node::ListItem { children } => {
            let li = create_element("li", vec![]);
            for child in children {
                append_block(&li, child);
            }
            append(parent, li);
        }
        Node::Blockquote { children } => {
            let quote = create_element("blockquote", vec![]);
            for child in children {
                append_block(&quote, child);
            }
            append(parent, quote);
        }
        Node::HorizontalRule => append(parent, create_element("hr", vec![])),
        Node::HardBreak | Node::Text { .. } => {
            let para = create_element("p", vec![]);
            append_inline(&para, std::slice::from_ref(node));
            append(parent, para);
        }
    }
}

fn table_element(rows: &[Node]) -> Handle {
    let table = create_element("table", vec![]);
    let head = create_element("thead", vec![]);
    let body = create_element("tbody", vec![]);
    let mut has_head = false;
    let mut has_body = false;

    for row in rows {
        let tr = create_element("tr", vec![]);
        let mut all_header = !row.children().is_empty();
        for cell in row.children() {
            if let Node::TableCell {
                header,
                align,
                children,
            } = cell
            {
                all_header &= *header;
                let attrs = align.as_attr().map(|a| vec![("align", a)]).unwrap_or_default();
                let td = create_element(if *header { "th" } else { "td" }, attrs);
                append_inline(&td, children);
                append(&tr, td);
            }
        }
        if all_header && !has_body {
            has_head = true;
            append(&head, tr);
        } else {
            has_body = true;
            append(&body, tr);
        }
    }

    if has_head {
        append(&table, head);
    }
    if has_body {
        append(&table, body);
    }
    table
}

fn mark_element(mark: &Mark) -> Handle {
    match mark {
        Mark::Link { href, title } => {
            let mut attrs = vec![("href", href.as_str())];
            if let Some(title) = title {
                attrs.push(("title", title.as_str()));
            }
            create_element("a", attrs)
        }
        Mark::Bold => create_element("strong", vec![]),
        Mark::Italic => create_element("em", vec![]),
        Mark::Strike => create_element("s", vec![]),
        Mark::Code => create_element("code", vec![]),
    }
}

fn image_element(image: &Image) -> Handle {
    let mut attrs = vec![("src", image.src.as_str())];
    if !image.alt.is_empty() {
        attrs.push(("alt", image.alt.as_str()));
    }
    if let Some(title) = &image.title {
        attrs.push(("title", title.as_str()));
    }
    if let Some(original) = &image.original {
        attrs.push(("data-original", original.as_str()));
    }
    create_element("img", attrs)
}

/// Append inline nodes, keeping shared marks open across neighbours.
fn append_inline(parent: &Handle, nodes: &[Node]) {
    let mut open: Vec<(Mark, Handle)> = Vec::new();

    for node in nodes {
        let marks: &[Mark] = match node {
            Node::Text { marks, .. } => marks,
            _ => &[],
        };
        let keep = open
            .iter()
            .zip(marks)
            .take_while(|((open_mark, _), mark)| open_mark == *mark)
            .count();
        open.truncate(keep);
        for mark in &marks[keep..] {
            let element = mark_element(mark);
            let target = open.last().map(|(_, h)| h.clone()).unwrap_or_else(|| parent.clone());
            append(&target, element.clone());
            open.push((mark.clone(), element));
        }

        let target = open.last().map(|(_, h)| h.clone()).unwrap_or_else(|| parent.clone());
        match node {
            Node::Text { text, .. } => append(&target, create_text(text)),
            Node::HardBreak => append(&target, create_element("br", vec![])),
            Node::Image(image) => append(&target, image_element(image)),
            block => append_block(&target, block),
        }
    }
}
