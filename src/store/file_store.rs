use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{TokenStore, TOKEN_KEY};

/// Persists the token in a JSON object file under the `"token"` key.
/// Other keys in the file belong to someone else and are left alone.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, String> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(format!("Error reading {}: {}", self.path.display(), e)),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                // A corrupt file is treated like an empty one; the next save rewrites it.
                warn!("Ignoring unreadable token file {}", self.path.display());
                Ok(Map::new())
            }
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| format!("Error creating {}: {}", parent.display(), e))?;
            }
        }
        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| format!("Error serializing token file: {}", e))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| format!("Error writing {}: {}", self.path.display(), e))?;
        restrict_permissions(&self.path).await
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), String> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| format!("Error restricting {}: {}", path.display(), e))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), String> {
    Ok(())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, String> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    async fn save(&self, token: &str) -> Result<(), String> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), Value::from(token));
        self.write_entries(&entries).await?;
        debug!("Token saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<bool, String> {
        let mut entries = self.read_entries().await?;
        let existed = entries.remove(TOKEN_KEY).is_some();
        if existed {
            self.write_entries(&entries).await?;
            debug!("Token removed from {}", self.path.display());
        }
        Ok(existed)
    }
}
