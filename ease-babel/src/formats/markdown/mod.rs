//! Markdown format implementation
//!
//! This module implements bidirectional conversion between Markdown and the
//! structured document edited in the rich view.
//!
//! # Library Choice
//!
//! Loading uses the `comrak` crate (CommonMark + GFM tables/strikethrough) to
//! render HTML, which is then parsed with `html5ever` into the document. The
//! way back walks the HTML DOM with a small rule engine: Comrak's own
//! CommonMark writer cannot carry editor-only attributes such as
//! `data-original` on images or `data-language` on code blocks.
//!
//! # Element Mapping Table
//!
//! | Document node    | Markdown                | Export Notes                              | Import Notes                           |
//! |------------------|-------------------------|-------------------------------------------|----------------------------------------|
//! | Heading          | `#`..`######`           | Always ATX; Setext via style rules        | ATX and Setext                          |
//! | Paragraph        | Paragraph               | Continuation lines keep their indentation | Leading spaces become NBSP             |
//! | CodeBlock        | Fenced block            | Fence grows past inner backtick runs      | Unknown tags kept as `data-language`   |
//! | Image            | `![alt](src "title")`   | Writes the original source                | Local files shown as data URIs         |
//! | List / ListItem  | `- ` / `N. `            | Marker style via style rules              | Tight and loose lists parse the same   |
//! | Blockquote       | `> `                    | Direct mapping                            | Direct mapping                         |
//! | Table            | GFM pipe table          | Alignment row from cell alignment         | Direct mapping                         |
//! | HorizontalRule   | `---`                   | Direct mapping                            | Direct mapping                         |
//! | Marks            | `**` `_` `~~` `` ` `` `[]()` | Italic uses `*` inside words         | Direct mapping                         |
//!
//! # Lossy Conversions
//!
//! - Raw HTML is shown as literal text and written back escaped as text
//! - Reference-style links become inline links
//! - Blank-line counts collapse to a single blank line
//! - Links wrapping an image are dropped

pub mod parser;
pub mod serializer;
pub mod style;

use crate::document::Document;
use crate::error::FormatError;
use crate::format::{Direction, Format};
use parser::LoadContext;
use style::StyleRules;

/// Format implementation for Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    /// Applied when loading (document path, tab width, render toggles).
    pub context: LoadContext,
    /// Applied after serialization.
    pub rules: StyleRules,
}

impl MarkdownFormat {
    pub fn new(context: LoadContext, rules: StyleRules) -> Self {
        Self { context, rules }
    }

    /// Serialize and normalize, never failing.
    pub fn to_markdown(&self, doc: &Document) -> String {
        style::normalize(&serializer::serialize(doc), &self.rules)
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with GFM tables and strikethrough"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown", "mdx"]
    }

    fn can(&self, _direction: Direction) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parser::load_document(source, &self.context))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(self.to_markdown(doc))
    }
}
