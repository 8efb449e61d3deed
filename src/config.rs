use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory where persisted state is stored
    pub data_dir: PathBuf,

    /// Timeout for chat-completion requests, in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("astronotes"))
            .unwrap_or_else(|| PathBuf::from("astronotes-data"));

        Self {
            data_dir,
            request_timeout_secs: 30,
        }
    }
}
