//! Local key-value persistence layer.
//!
//! All durable state lives behind a small key->opaque-value interface: the
//! full notes array, the full chat history, the API key, and the background
//! selection. The file-backed implementation writes each value through a
//! temporary file followed by an atomic rename so a crash mid-write never
//! leaves a truncated value behind.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::{debug, error, info, trace};
use tempfile::NamedTempFile;

use crate::{AstroError, Result};

/// Persisted key for the full notes collection.
pub const KEY_NOTES: &str = "notes";
/// Persisted key for the full chat history.
pub const KEY_CHAT_HISTORY: &str = "chatHistory";
/// Persisted key for the OpenAI API credential.
pub const KEY_API_KEY: &str = "openai_api_key";
/// Persisted key for the background selection.
pub const KEY_BACKGROUND: &str = "background_image";

/// Abstraction over the durable key-value storage backing all stores.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`; absent keys are fine.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store keeping one file per key under a data directory.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates the store, ensuring the data directory exists.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            debug!("Data directory does not exist, creating: {}", data_dir.display());
            fs::create_dir_all(&data_dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                AstroError::DirectoryError {
                    path: data_dir.clone(),
                }
            })?;
        }

        info!("FileStore opened at {}", data_dir.display());
        Ok(Self { data_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            trace!("No value stored for key '{}'", key);
            return Ok(None);
        }

        let value = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read {}: {}", path.display(), e);
            AstroError::Io(e)
        })?;
        trace!("Read {} bytes for key '{}'", value.len(), key);
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            AstroError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            AstroError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            AstroError::Io(e)
        })?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            AstroError::Io(e.error)
        })?;

        debug!("Persisted key '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                error!("Failed to remove {}: {}", path.display(), e);
                AstroError::Io(e)
            })?;
            debug!("Removed key '{}'", key);
        }
        Ok(())
    }
}

/// In-memory store used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| AstroError::ApplicationError {
            message: "Failed to acquire lock on memory store".to_string(),
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| AstroError::ApplicationError {
            message: "Failed to acquire lock on memory store".to_string(),
        })?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| AstroError::ApplicationError {
            message: "Failed to acquire lock on memory store".to_string(),
        })?;
        values.remove(key);
        Ok(())
    }
}
