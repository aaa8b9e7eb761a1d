//! Error types for session operations
//!
//! Session entry points record a status message and log these rather than
//! returning them; the lower-level helpers (stores, uploader, file access)
//! return them so callers and tests can tell failures apart.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Store error: {0}")]
    Store(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Document has no path")]
    NoPath,
    #[error("Cancelled")]
    Cancelled,
}

impl SessionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SessionError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
