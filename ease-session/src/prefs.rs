//! Preferences persisted in the key-value store.

use crate::error::Result;
use crate::store::KeyValueStore;
use ease_config::Preferences;

pub const PREFERENCES_KEY: &str = "ease-md:preferences";

/// Stored preferences, field by field over the defaults.
pub fn load(store: &impl KeyValueStore) -> Preferences {
    store
        .get(PREFERENCES_KEY)
        .map(|raw| Preferences::from_json_lenient(&raw))
        .unwrap_or_default()
}

pub fn save(store: &mut impl KeyValueStore, prefs: &Preferences) -> Result<()> {
    store.set(PREFERENCES_KEY, &prefs.to_json())
}
