//! Markdown format tests
//!
//! Rendering, serialization back to Markdown, style normalization and the
//! source outline.

mod outline;
mod render;
mod roundtrip;
mod serialize;
mod style;
