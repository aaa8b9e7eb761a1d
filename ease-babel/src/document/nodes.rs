//! Core data structures for the structured document.

use serde::Serialize;

/// Address of a node: child indices from the document root down to the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    /// The empty path, addressing the document itself.
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    /// Path of the `index`-th child of the node at this path.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        NodePath(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the parent node and this node's index within it.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (last, rest) = self.0.split_last()?;
        Some((NodePath(rest.to_vec()), *last))
    }
}

/// A node of the structured document.
///
/// Block nodes (headings, paragraphs, lists...) hold other nodes; inline nodes
/// (text, images, hard breaks) only appear inside headings, paragraphs and
/// table cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    CodeBlock {
        /// Declared language tag, lowercased. `None` for untagged blocks.
        language: Option<String>,
        code: String,
    },
    Image(Image),
    Table {
        rows: Vec<Node>,
    },
    TableRow {
        cells: Vec<Node>,
    },
    TableCell {
        header: bool,
        align: Align,
        children: Vec<Node>,
    },
    List {
        ordered: bool,
        start: u64,
        items: Vec<Node>,
    },
    ListItem {
        children: Vec<Node>,
    },
    Blockquote {
        children: Vec<Node>,
    },
    HorizontalRule,
    HardBreak,
    Text {
        text: String,
        marks: Vec<Mark>,
    },
}

impl Node {
    /// Unmarked text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Text node carrying the given marks (stored in canonical order).
    pub fn marked_text(text: impl Into<String>, mut marks: Vec<Mark>) -> Self {
        sort_marks(&mut marks);
        Node::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        Node::Heading {
            level: level.clamp(1, 6),
            children,
        }
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::TableCell { children, .. }
            | Node::ListItem { children }
            | Node::Blockquote { children } => children,
            Node::List { items, .. } => items,
            Node::Table { rows } => rows,
            Node::TableRow { cells } => cells,
            Node::CodeBlock { .. }
            | Node::Image(_)
            | Node::HorizontalRule
            | Node::HardBreak
            | Node::Text { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::TableCell { children, .. }
            | Node::ListItem { children }
            | Node::Blockquote { children } => Some(children),
            Node::List { items, .. } => Some(items),
            Node::Table { rows } => Some(rows),
            Node::TableRow { cells } => Some(cells),
            Node::CodeBlock { .. }
            | Node::Image(_)
            | Node::HorizontalRule
            | Node::HardBreak
            | Node::Text { .. } => None,
        }
    }

    /// Whether this node may only appear inside a textblock.
    pub fn is_inline(&self) -> bool {
        matches!(self, Node::Text { .. } | Node::Image(_) | Node::HardBreak)
    }

    /// Concatenated text of this node and its descendants.
    ///
    /// Hard breaks count as a newline; images contribute nothing.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { text, .. } => out.push_str(text),
            Node::CodeBlock { code, .. } => out.push_str(code),
            Node::HardBreak => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Inline formatting attached to a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Link { href: String, title: Option<String> },
    Bold,
    Italic,
    Strike,
    Code,
}

impl Mark {
    /// Nesting rank: lower ranks wrap higher ones when rendered.
    pub fn rank(&self) -> u8 {
        match self {
            Mark::Link { .. } => 0,
            Mark::Bold => 1,
            Mark::Italic => 2,
            Mark::Strike => 3,
            Mark::Code => 4,
        }
    }
}

/// Sort marks into canonical nesting order and drop duplicates.
pub fn sort_marks(marks: &mut Vec<Mark>) {
    marks.sort_by_key(Mark::rank);
    marks.dedup_by(|a, b| a.rank() == b.rank());
}

/// An image reference.
///
/// `src` is what the display surface loads (data URI, URL, resolved path);
/// `original` is the text that appeared in the Markdown source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    pub src: String,
    pub original: Option<String>,
    pub alt: String,
    pub title: Option<String>,
}

impl Image {
    /// The source to write back to Markdown.
    pub fn markdown_source(&self) -> &str {
        self.original.as_deref().unwrap_or(&self.src)
    }
}

/// Alignment of a table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Align {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("left") => Align::Left,
            Some("center") => Align::Center,
            Some("right") => Align::Right,
            _ => Align::None,
        }
    }

    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Center => Some("center"),
            Align::Right => Some("right"),
        }
    }
}
