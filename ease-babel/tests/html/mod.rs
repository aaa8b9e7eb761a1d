//! HTML format tests
//!
//! HTML as the rich view hands it over (pasted content, editor output) and the
//! HTML the document writes back.

mod export;
mod import;
