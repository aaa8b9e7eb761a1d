//! Helpers over the html5ever reference-counted DOM
//!
//! Every HTML pass in this crate (image decoration, indentation preservation,
//! document building and serialization) parses with html5ever, edits the
//! `RcDom` in place and serializes the `<body>` children back out.

use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope,
    Attribute, LocalName, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Parse an HTML fragment into a full document tree.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// The `<body>` element of a parsed document.
pub fn body(dom: &RcDom) -> Option<Handle> {
    let html = find_child(&dom.document, "html")?;
    find_child(&html, "body")
}

fn find_child(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| tag_name(child).as_deref() == Some(tag))
        .cloned()
}

/// Lowercase local name of an element, `None` for non-elements.
pub fn tag_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

pub fn is_element(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if &*name.local == tag)
}

/// Attribute value on an element.
pub fn attr(handle: &Handle, key: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Set (or add) an attribute on an element. No-op on other nodes.
pub fn set_attr(handle: &Handle, key: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &handle.data {
        let mut attrs = attrs.borrow_mut();
        if let Some(existing) = attrs.iter_mut().find(|a| &*a.name.local == key) {
            existing.value = value.to_string().into();
        } else {
            attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(key)),
                value: value.to_string().into(),
            });
        }
    }
}

/// Class names of an element, split on whitespace.
pub fn classes(handle: &Handle) -> Vec<String> {
    attr(handle, "class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Element children only, skipping text and comments.
pub fn element_children(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|c| matches!(c.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Concatenated text of a subtree.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

/// Elements that flow inside a line.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "del", "em", "i", "img", "kbd", "mark", "s", "small", "span",
    "strike", "strong", "sub", "sup", "u",
];

fn is_inline(handle: &Handle) -> bool {
    tag_name(handle).is_some_and(|tag| INLINE_TAGS.contains(&tag.as_str()))
}

pub fn parent(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take();
    let parent = weak.as_ref().and_then(|weak| weak.upgrade());
    handle.parent.set(weak);
    parent
}

fn previous_sibling(parent: &Handle, handle: &Handle) -> Option<Handle> {
    let siblings = parent.children.borrow();
    let index = siblings.iter().position(|child| Rc::ptr_eq(child, handle))?;
    index.checked_sub(1).map(|i| siblings[i].clone())
}

/// Whether content placed after `handle` begins a new line.
fn ends_line(handle: &Handle) -> bool {
    match &handle.data {
        NodeData::Text { contents } => contents.borrow().ends_with('\n'),
        NodeData::Element { .. } => is_element(handle, "br") || !is_inline(handle),
        _ => false,
    }
}

/// Whether `handle` starts a visual line: only inline wrappers stand between
/// it and the start of its block, or it follows a `<br>` or a newline.
pub fn starts_line(handle: &Handle) -> bool {
    let mut current = handle.clone();
    loop {
        let Some(parent) = parent(&current) else {
            return true;
        };
        if let Some(previous) = previous_sibling(&parent, &current) {
            return ends_line(&previous);
        }
        if !is_inline(&parent) {
            return true;
        }
        current = parent;
    }
}

/// Visit every node below `root` in document order.
///
/// The callback receives each node and the chain of its element ancestors'
/// tag names (innermost last).
pub fn walk(root: &Handle, visit: &mut dyn FnMut(&Handle, &[String])) {
    let mut ancestors = Vec::new();
    walk_inner(root, &mut ancestors, visit);
}

fn walk_inner(handle: &Handle, ancestors: &mut Vec<String>, visit: &mut dyn FnMut(&Handle, &[String])) {
    let children: Vec<Handle> = handle.children.borrow().iter().cloned().collect();
    let tag = tag_name(handle);
    if let Some(tag) = &tag {
        ancestors.push(tag.clone());
    }
    for child in &children {
        visit(child, ancestors);
        walk_inner(child, ancestors, visit);
    }
    if tag.is_some() {
        ancestors.pop();
    }
}

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

pub fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Serialize the children of `parent` (not `parent` itself) to HTML.
///
/// Serialization into an in-memory buffer only fails on invalid UTF-8, which
/// the DOM cannot hold; such output is dropped rather than reported.
pub fn serialize_children(parent: &Handle) -> String {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in parent.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        if let Err(e) = serialize(&mut output, &serializable, opts.clone()) {
            tracing::debug!("HTML serialization failed: {e}");
        }
    }

    String::from_utf8(output).unwrap_or_default()
}

/// Parse `html`, let `edit` mutate the body, and serialize the body back.
pub fn rewrite_body(html: &str, edit: impl FnOnce(&Handle)) -> String {
    let dom = parse_html(html);
    match body(&dom) {
        Some(body) => {
            edit(&body);
            serialize_children(&body)
        }
        None => html.to_string(),
    }
}
