//! Name and extension lookup over the available formats.

use std::collections::BTreeMap;
use std::path::Path;

use crate::document::Document;
use crate::error::FormatError;
use crate::format::{Direction, Format};
use crate::formats::html::HtmlFormat;
use crate::formats::markdown::MarkdownFormat;

/// Formats keyed by name. `default()` holds markdown and html.
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let html = registry.convert("# Title\n", "markdown", "html")?;
/// ```
pub struct FormatRegistry {
    formats: BTreeMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    pub fn empty() -> Self {
        FormatRegistry {
            formats: BTreeMap::new(),
        }
    }

    /// Add a format, replacing any format registered under the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|format| format.as_ref())
            .ok_or_else(|| FormatError::UnknownFormat {
                name: name.to_string(),
                known: self.names(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.formats.keys().cloned().collect()
    }

    /// Format name for a file, by case-insensitive extension.
    pub fn detect(&self, path: &Path) -> Option<&str> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name())
    }

    fn capable(&self, name: &str, direction: Direction) -> Result<&dyn Format, FormatError> {
        let format = self.get(name)?;
        if format.can(direction) {
            Ok(format)
        } else {
            Err(format.unsupported(direction))
        }
    }

    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        self.capable(format, Direction::Read)?.parse(source)
    }

    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, FormatError> {
        self.capable(format, Direction::Write)?.serialize(doc)
    }

    /// Parse with `from` and write with `to`. Both formats are checked
    /// before any work is done.
    pub fn convert(&self, source: &str, from: &str, to: &str) -> Result<String, FormatError> {
        let reader = self.capable(from, Direction::Read)?;
        let writer = self.capable(to, Direction::Write)?;
        writer.serialize(&reader.parse(source)?)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(MarkdownFormat::default());
        registry.register(HtmlFormat);
        registry
    }
}
