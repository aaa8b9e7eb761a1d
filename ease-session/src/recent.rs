//! Most-recently-used document list.

use crate::error::{Result, SessionError};
use crate::store::KeyValueStore;
use std::path::{Path, PathBuf};

pub const RECENT_KEY: &str = "ease-md:recent-files";
pub const MAX_RECENTS: usize = 20;

/// Stored list, most recent first. A corrupt entry reads as empty.
pub fn load(store: &impl KeyValueStore) -> Vec<PathBuf> {
    let Some(raw) = store.get(RECENT_KEY) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::debug!("ignoring corrupt recent files list: {e}");
        Vec::new()
    })
}

fn store_list(store: &mut impl KeyValueStore, list: &[PathBuf]) -> Result<()> {
    let value = serde_json::to_string(list).map_err(|e| SessionError::Store(e.to_string()))?;
    store.set(RECENT_KEY, &value)
}

/// Move `path` to the front, dropping duplicates and anything past
/// [`MAX_RECENTS`]. Returns the new list.
pub fn push(store: &mut impl KeyValueStore, path: &Path) -> Result<Vec<PathBuf>> {
    let mut list = load(store);
    list.retain(|existing| existing != path);
    list.insert(0, path.to_path_buf());
    list.truncate(MAX_RECENTS);
    store_list(store, &list)?;
    Ok(list)
}

pub fn remove(store: &mut impl KeyValueStore, path: &Path) -> Result<Vec<PathBuf>> {
    let mut list = load(store);
    list.retain(|existing| existing != path);
    store_list(store, &list)?;
    Ok(list)
}
