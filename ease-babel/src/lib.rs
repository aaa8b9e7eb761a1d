//! Markdown ⇄ structured document conversion for the Ease MD editor
//!
//!     This crate turns Markdown into the structured document edited by the rich view and
//!     back again, preserving what a plain Markdown → HTML → Markdown cycle loses: original
//!     image sources, declared code-block languages, leading indentation, list and heading
//!     style.
//!
//!     This is a pure lib: it powers the ease session and CLI but is shell agnostic, that
//!     is no code here reads env vars, prints, or touches anything but the image files a
//!     document points at.
//!
//! Architecture
//!
//!     HTML is the exchange representation. Loading renders Markdown to HTML, decorates
//!     images and preserves indentation on that HTML, then parses it into a Document.
//!     Saving serializes the Document to HTML and walks that DOM with a rule engine to
//!     produce Markdown, which the style normalizer then rewrites.
//!
//!         Markdown ─render─▶ HTML ─images─▶ ─whitespace─▶ Document
//!         Document ─to_html─▶ HTML ─rules─▶ Markdown ─style─▶ Markdown
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── outline.rs              # Heading outline of a document or its source
//!     ├── document                # Structured document (nodes, marks, paths)
//!     ├── formats
//!     │   ├── html                # HTML ⇄ Document
//!     │   └── markdown            # render, rule-based serializer, style normalizer
//!     ├── common                  # DOM helpers, images, languages, whitespace
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     └── <area>
//!         ├── <testname>.rs
//!         └── fixtures
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Totality
//!
//!     Every conversion function accepts any input and returns a value: malformed Markdown or
//!     HTML degrades, unreadable images keep their raw source. `FormatError` only reports
//!     registry lookups for formats or directions that do not exist.
pub mod common;
pub mod document;
pub mod error;
pub mod format;
pub mod formats;
pub mod outline;
pub mod registry;

pub use document::{Document, Node, NodePath};
pub use error::FormatError;
pub use format::{Direction, Format};
pub use formats::markdown::parser::{
    load_document, markdown_to_html, render, LoadContext, RenderOptions,
};
pub use formats::markdown::serializer::serialize;
pub use formats::markdown::style::{normalize, StyleRules};
pub use outline::{Locator, OutlineEntry};
pub use registry::FormatRegistry;
