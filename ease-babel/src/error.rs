//! Errors at the format/registry boundary
//!
//! The conversion functions themselves are total: they accept any input text
//! and degrade instead of failing. Errors only surface when a caller asks the
//! registry for a format that does not exist or a direction it cannot do.

use thiserror::Error;

use crate::format::Direction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unknown format '{name}' (available: {})", .known.join(", "))]
    UnknownFormat { name: String, known: Vec<String> },

    #[error("format '{format}' does not support {direction}")]
    Unsupported { format: String, direction: Direction },
}
