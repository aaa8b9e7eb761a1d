//! The structured document edited by the rich view
//!
//! A [`Document`] is a tree of [`Node`]s addressed by [`NodePath`]. It is built
//! from rendered HTML ([`Document::from_html`]) and turned back into HTML
//! ([`Document::to_html`]) for serialization to Markdown.

pub mod nodes;

pub use nodes::{sort_marks, Align, Image, Mark, Node, NodePath};

use crate::common::images;
use crate::common::languages::{normalize_code_language, PLAINTEXT};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Document { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Build a document from (rendered) HTML.
    pub fn from_html(html: &str) -> Self {
        crate::formats::html::parser::document_from_html(html)
    }

    /// HTML representation of the document, with `data-original` on images
    /// and `data-language` on code blocks.
    pub fn to_html(&self) -> String {
        crate::formats::html::serializer::document_to_html(self)
    }

    /// Every node with its path, in document order (pre-order).
    pub fn descendants(&self) -> Vec<(NodePath, &Node)> {
        let mut out = Vec::new();
        for (index, child) in self.children.iter().enumerate() {
            collect_descendants(child, NodePath(vec![index]), &mut out);
        }
        out
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for index in rest {
            node = node.children_mut()?.get_mut(*index)?;
        }
        Some(node)
    }

    /// Remove and return the node at `path`.
    pub fn remove(&mut self, path: &NodePath) -> Option<Node> {
        let (parent, index) = path.split_last()?;
        let siblings = if parent.depth() == 0 {
            &mut self.children
        } else {
            self.node_at_mut(&parent)?.children_mut()?
        };
        (index < siblings.len()).then(|| siblings.remove(index))
    }

    /// Plain text of the document, blocks separated by blank lines.
    pub fn text_content(&self) -> String {
        let mut blocks = Vec::new();
        collect_blocks(&self.children, &mut blocks);
        blocks.join("\n\n")
    }

    /// Whitespace-separated words of [`Document::text_content`].
    pub fn word_count(&self) -> usize {
        word_count(&self.text_content())
    }

    /// All images with their paths, in document order.
    pub fn images(&self) -> Vec<(NodePath, &Image)> {
        self.descendants()
            .into_iter()
            .filter_map(|(path, node)| match node {
                Node::Image(image) => Some((path, image)),
                _ => None,
            })
            .collect()
    }

    /// Set the language of the code block at `path`.
    ///
    /// The value is normalized against the recognized languages; `plaintext`
    /// (or anything unrecognized) clears the language. Returns `false` when
    /// `path` is not a code block.
    pub fn set_code_language(&mut self, path: &NodePath, value: &str) -> bool {
        match self.node_at_mut(path) {
            Some(Node::CodeBlock { language, .. }) => {
                let normalized = normalize_code_language(value);
                *language = (normalized != PLAINTEXT).then_some(normalized);
                true
            }
            _ => false,
        }
    }

    /// Replace the image at `path` from a `![alt](src)` snippet.
    ///
    /// The new source is kept as the original and resolved for display against
    /// `document_path`. Leaves the node unchanged and returns `false` when the
    /// snippet does not parse or `path` is not an image.
    pub fn update_image(
        &mut self,
        path: &NodePath,
        snippet: &str,
        document_path: Option<&Path>,
    ) -> bool {
        let Some(parsed) = images::parse_image_markdown(snippet) else {
            return false;
        };
        match self.node_at_mut(path) {
            Some(Node::Image(image)) => {
                let display = images::resolve(&parsed.src, document_path);
                image.original = (display != parsed.src).then(|| parsed.src.clone());
                image.src = display;
                image.alt = parsed.alt;
                true
            }
            _ => false,
        }
    }
}

fn collect_descendants<'a>(node: &'a Node, path: NodePath, out: &mut Vec<(NodePath, &'a Node)>) {
    out.push((path.clone(), node));
    for (index, child) in node.children().iter().enumerate() {
        collect_descendants(child, path.child(index), out);
    }
}

fn collect_blocks(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Heading { .. } | Node::Paragraph { .. } | Node::CodeBlock { .. } => {
                out.push(node.text_content())
            }
            Node::TableCell { .. } => out.push(node.text_content()),
            Node::HorizontalRule => {}
            _ => collect_blocks(node.children(), out),
        }
    }
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
