use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the bearer token is kept between runs.
/// - enabled: if false, the token only lives in memory (MemoryTokenStore).
/// - path: the key/value file holding the token; defaults to the user config dir.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl StorageConfig {
    /// The configured path, or `<config dir>/taskdeck/storage.json`.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(p) => p.clone(),
            None => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("taskdeck")
                .join("storage.json"),
        }
    }
}
