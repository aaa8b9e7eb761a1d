//! Format implementations
//!
//! This module contains the format implementations that convert between
//! the structured document and text representations.

pub mod html;
pub mod markdown;

pub use html::HtmlFormat;
pub use markdown::MarkdownFormat;
