//! Shared helpers used by the format implementations: DOM access, image
//! source resolution, indentation preservation and code languages.

pub mod dom;
pub mod images;
pub mod languages;
pub mod whitespace;
