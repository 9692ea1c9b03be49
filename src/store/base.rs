use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_store::FileTokenStore, memory_store::MemoryTokenStore};
use crate::config::StorageConfig;

/// The fixed key the bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

/// The TokenStore trait abstracts where the bearer token lives between calls.
/// A missing or unreadable token means "unauthenticated".
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, String>;
    async fn save(&self, token: &str) -> Result<(), String>;
    /// Removes the token. Returns whether there was one.
    async fn clear(&self) -> Result<bool, String>;
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Creates a token store based on the StorageConfig.
/// If `storage.enabled = false`, the token only lives as long as the process.
pub fn create_token_store(config: &StorageConfig) -> Arc<dyn TokenStore> {
    if !config.enabled {
        info!("Token storage is disabled. Using in-memory store.");
        return Arc::new(MemoryTokenStore::new());
    }

    let path = config.resolved_path();
    info!("Using token file {}", path.display());
    Arc::new(FileTokenStore::new(path))
}
