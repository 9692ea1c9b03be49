use std::sync::Mutex;

use async_trait::async_trait;

use super::TokenStore;

/// Keeps the token in process memory only.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, String> {
        self.token
            .lock()
            .map_err(|_| "Token store lock poisoned".to_string())
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, String> {
        Ok(self.slot()?.clone())
    }

    async fn save(&self, token: &str) -> Result<(), String> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<bool, String> {
        Ok(self.slot()?.take().is_some())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("T").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("T".to_string()));

        assert!(store.clear().await.unwrap());
        assert!(!store.clear().await.unwrap());
        assert_eq!(store.load().await.unwrap(), None);
    }
}
