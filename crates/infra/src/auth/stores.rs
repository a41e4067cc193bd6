//! Token store implementations
//!
//! `MemoryTokenStore` for tests and single-process deployments,
//! `FileTokenStore` for tokens that must survive a restart. Both hold at
//! most one token per system.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use syncbridge_core::TokenStore;
use syncbridge_domain::{ExternalSystem, Result, SyncError, Token};

/// In-memory token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<ExternalSystem, Token>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, system: ExternalSystem) -> Result<Option<Token>> {
        let tokens = self.tokens.lock().map_err(poisoned)?;
        Ok(tokens.get(&system).cloned())
    }

    async fn put(&self, token: Token) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(poisoned)?;
        tokens.insert(token.system, token);
        Ok(())
    }

    async fn clear(&self, system: ExternalSystem) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(poisoned)?;
        tokens.remove(&system);
        Ok(())
    }
}

/// JSON-file-backed token store.
///
/// The whole map is rewritten on every change; token updates are rare
/// enough that this is fine. The file is created lazily on first `put`.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<HashMap<ExternalSystem, Token>>,
}

impl FileTokenStore {
    /// Open a store at `path`, loading existing tokens when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tokens = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                SyncError::Internal(format!("failed to read token store {}: {e}", path.display()))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                SyncError::Serialization(format!(
                    "token store {} is corrupt: {e}",
                    path.display()
                ))
            })?
        } else {
            HashMap::new()
        };

        Ok(Self { path, tokens: Mutex::new(tokens) })
    }

    fn persist(&self, tokens: &HashMap<ExternalSystem, Token>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SyncError::Internal(format!(
                        "failed to create token store directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        let contents = serde_json::to_string_pretty(tokens)
            .map_err(|e| SyncError::Serialization(format!("failed to encode token store: {e}")))?;
        std::fs::write(&self.path, contents).map_err(|e| {
            SyncError::Internal(format!("failed to write token store {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, system: ExternalSystem) -> Result<Option<Token>> {
        let tokens = self.tokens.lock().map_err(poisoned)?;
        Ok(tokens.get(&system).cloned())
    }

    async fn put(&self, token: Token) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(poisoned)?;
        tokens.insert(token.system, token);
        self.persist(&tokens)
    }

    async fn clear(&self, system: ExternalSystem) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(poisoned)?;
        if tokens.remove(&system).is_some() {
            self.persist(&tokens)?;
        }
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> SyncError {
    SyncError::Internal("token store mutex poisoned".into())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn token(system: ExternalSystem, value: &str) -> Token {
        Token::new(value.to_string(), system, Utc::now(), 3600)
    }

    #[tokio::test]
    async fn memory_store_round_trips_per_system() {
        let store = MemoryTokenStore::new();
        store.put(token(ExternalSystem::Erp, "erp-tok")).await.unwrap();
        store.put(token(ExternalSystem::Crm, "crm-tok")).await.unwrap();

        let erp = store.get(ExternalSystem::Erp).await.unwrap().unwrap();
        assert_eq!(erp.value, "erp-tok");

        store.clear(ExternalSystem::Erp).await.unwrap();
        assert!(store.get(ExternalSystem::Erp).await.unwrap().is_none());
        assert!(store.get(ExternalSystem::Crm).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn put_replaces_previous_token() {
        let store = MemoryTokenStore::new();
        store.put(token(ExternalSystem::Erp, "old")).await.unwrap();
        store.put(token(ExternalSystem::Erp, "new")).await.unwrap();

        let current = store.get(ExternalSystem::Erp).await.unwrap().unwrap();
        assert_eq!(current.value, "new");
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileTokenStore::open(&path).unwrap();
        store.put(token(ExternalSystem::Erp, "persisted")).await.unwrap();
        drop(store);

        let reopened = FileTokenStore::open(&path).unwrap();
        let restored = reopened.get(ExternalSystem::Erp).await.unwrap().unwrap();
        assert_eq!(restored.value, "persisted");
        assert_eq!(restored.system, ExternalSystem::Erp);
    }

    #[tokio::test]
    async fn file_store_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileTokenStore::open(&path).unwrap();
        store.put(token(ExternalSystem::Crm, "gone-soon")).await.unwrap();
        store.clear(ExternalSystem::Crm).await.unwrap();
        drop(store);

        let reopened = FileTokenStore::open(&path).unwrap();
        assert!(reopened.get(ExternalSystem::Crm).await.unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileTokenStore::open(&path).unwrap_err();
        assert!(matches!(err, SyncError::Serialization(_)));
    }
}
