//! User preference scalars: the API credential and the background selection.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    storage::{KEY_API_KEY, KEY_BACKGROUND},
    Background, KeyValueStore, Result,
};

/// Reads and writes the two independently persisted preferences. Absence is
/// a valid state for both.
pub struct Settings {
    store: Arc<dyn KeyValueStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored OpenAI API key, or `None` when unset. Read failures are
    /// logged and treated as unset.
    pub fn api_key(&self) -> Option<String> {
        match self.store.get(KEY_API_KEY) {
            Ok(Some(key)) if !key.trim().is_empty() => Some(key),
            Ok(_) => {
                debug!("No API key stored");
                None
            }
            Err(e) => {
                warn!("Failed to read API key, treating as unset: {}", e);
                None
            }
        }
    }

    pub fn set_api_key(&self, key: &str) -> Result<()> {
        self.store.set(KEY_API_KEY, key)?;
        info!("API key updated");
        Ok(())
    }

    pub fn clear_api_key(&self) -> Result<()> {
        self.store.remove(KEY_API_KEY)?;
        info!("API key cleared");
        Ok(())
    }

    /// The selected background, falling back to the default when unset or
    /// when storage holds an id outside the known set.
    pub fn background(&self) -> Background {
        match self.store.get(KEY_BACKGROUND) {
            Ok(Some(id)) => Background::from_id(&id).unwrap_or_else(|| {
                warn!("Unknown background id '{}', using default", id);
                Background::default()
            }),
            Ok(None) => Background::default(),
            Err(e) => {
                warn!("Failed to read background selection: {}", e);
                Background::default()
            }
        }
    }

    pub fn set_background(&self, background: Background) -> Result<()> {
        self.store.set(KEY_BACKGROUND, background.id())?;
        info!("Background set to {}", background.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::MemoryStore;

    use super::*;

    fn settings() -> Settings {
        Settings::new(Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>)
    }

    #[test]
    fn api_key_round_trips_and_clears() {
        let settings = settings();
        assert_eq!(settings.api_key(), None);

        settings.set_api_key("sk-test-123").expect("set should succeed");
        assert_eq!(settings.api_key().as_deref(), Some("sk-test-123"));

        settings.clear_api_key().expect("clear should succeed");
        assert_eq!(settings.api_key(), None);
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let settings = settings();
        settings.set_api_key("   ").expect("set should succeed");
        assert_eq!(settings.api_key(), None);
    }

    #[test]
    fn background_defaults_until_set() {
        let settings = settings();
        assert_eq!(settings.background(), Background::Space);

        settings
            .set_background(Background::Space2)
            .expect("set should succeed");
        assert_eq!(settings.background(), Background::Space2);
    }

    #[test]
    fn unknown_persisted_background_falls_back_to_default() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(KEY_BACKGROUND, "lava").expect("set should succeed");
        let settings = Settings::new(kv as Arc<dyn KeyValueStore>);
        assert_eq!(settings.background(), Background::Space);
    }
}
