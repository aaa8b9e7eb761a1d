//! HTML format implementation
//!
//! This module converts between the structured document and HTML, which is the
//! exchange representation of the whole pipeline: the Markdown renderer
//! produces it, the rich view loads it, and the Markdown serializer walks it.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` ecosystem for both directions:
//! - `html5ever`: browser-grade HTML5 parser, handles malformed input gracefully
//! - `markup5ever_rcdom`: reference-counted DOM tree we can edit in place
//!
//! # Element Mapping Table
//!
//! | Document node    | HTML                                                   | Notes                                   |
//! |------------------|--------------------------------------------------------|-----------------------------------------|
//! | Heading          | `<h1>`..`<h6>`                                         |                                         |
//! | Paragraph        | `<p>`                                                  | stray inline content is wrapped in one  |
//! | CodeBlock        | `<pre data-language="L"><code class="language-L">`     | `data-language` wins over the class     |
//! | Image            | `<img src alt title data-original>`                    | `data-original` = Markdown source       |
//! | List / ListItem  | `<ul>` / `<ol start>` / `<li>`                         | tight and loose items parse the same    |
//! | Blockquote       | `<blockquote>`                                         |                                         |
//! | Table            | `<table>` `<thead>`/`<tbody>` `<tr>` `<th>`/`<td align>` | `style="text-align"` also read        |
//! | HorizontalRule   | `<hr>`                                                 |                                         |
//! | HardBreak        | `<br>`                                                 |                                         |
//! | Marks            | `<a>` `<strong>`/`<b>` `<em>`/`<i>` `<s>`/`<del>` `<code>` |                                     |
//!
//! # Lossy Conversions
//!
//! - Generic containers (`div`, `section`...) are flattened into their children
//! - Links around images are dropped
//! - Unknown inline elements keep their text only

pub mod parser;
pub mod serializer;

use crate::document::Document;
use crate::error::FormatError;
use crate::format::{Direction, Format};

/// Format implementation for HTML fragments
#[derive(Debug, Default)]
pub struct HtmlFormat;

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML fragment"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn can(&self, _direction: Direction) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parser::document_from_html(source))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(serializer::document_to_html(doc))
    }
}
