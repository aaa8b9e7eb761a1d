//! The `Format` seam between source text and [`Document`].
//!
//! Formats built into this crate are total: reading never rejects input and
//! writing never fails. The `Result` return exists for formats that only work
//! in one direction.

use std::fmt;

use crate::document::Document;
use crate::error::FormatError;

/// Which way a conversion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source text into a document.
    Read,
    /// A document into source text.
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => f.write_str("reading"),
            Direction::Write => f.write_str("writing"),
        }
    }
}

/// A named text representation of a document.
///
/// ```ignore
/// struct WordsOnly;
///
/// impl Format for WordsOnly {
///     fn name(&self) -> &str {
///         "words"
///     }
///
///     fn can(&self, direction: Direction) -> bool {
///         direction == Direction::Write
///     }
///
///     fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
///         Ok(doc.text_content())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    fn name(&self) -> &str;

    /// One-line summary shown by `--list-formats`.
    fn description(&self) -> &str {
        ""
    }

    /// Extensions without the leading dot, lowercase.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn can(&self, direction: Direction) -> bool;

    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(self.unsupported(Direction::Read))
    }

    fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
        Err(self.unsupported(Direction::Write))
    }

    #[doc(hidden)]
    fn unsupported(&self, direction: Direction) -> FormatError {
        FormatError::Unsupported {
            format: self.name().to_string(),
            direction,
        }
    }
}
