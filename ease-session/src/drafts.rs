//! Unsaved drafts, one per document path.

use crate::error::{Result, SessionError};
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DRAFT_PREFIX: &str = "ease-md:draft:";
/// Key suffix for documents that have never been saved.
pub const UNTITLED: &str = "__untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
}

pub fn draft_key(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("{DRAFT_PREFIX}{}", path.display()),
        None => format!("{DRAFT_PREFIX}{UNTITLED}"),
    }
}

/// The stored draft under `key`. Corrupt entries read as absent.
pub fn load(store: &impl KeyValueStore, key: &str) -> Option<Draft> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(draft) => Some(draft),
        Err(e) => {
            tracing::debug!(key, "ignoring corrupt draft: {e}");
            None
        }
    }
}

/// Store `text` under `key`. Whitespace-only text is not stored; returns
/// whether anything was written.
pub fn save(store: &mut impl KeyValueStore, key: &str, text: &str, now_ms: i64) -> Result<bool> {
    if text.trim().is_empty() {
        return Ok(false);
    }
    let draft = Draft {
        text: text.to_string(),
        updated_at: now_ms,
    };
    let value = serde_json::to_string(&draft).map_err(|e| SessionError::Store(e.to_string()))?;
    store.set(key, &value)?;
    Ok(true)
}

pub fn clear(store: &mut impl KeyValueStore, key: &str) -> Result<()> {
    store.remove(key)
}
