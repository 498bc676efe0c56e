//! Key-value persistence capability.
//!
//! The session engine persists through a minimal string key-value surface:
//! two well-known keys hold the serialized session collection and the
//! current-session pointer. This module provides the trait plus a
//! file-backed implementation for stations and an in-memory one for tests
//! and ephemeral use.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A string key-value store.
///
/// Keys double as file names in the file-backed implementation, so callers
/// use short constant keys without path separators.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Absent keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one file per key under a root directory.
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Creates the store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).context("Failed to create key-value store directory")?;
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .context(format!("Failed to read key file: {:?}", path))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        fs::write(&path, value).context(format!("Failed to write key file: {:?}", path))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).context(format!("Failed to remove key file: {:?}", path))?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();

        assert!(store.get("oves-sessions").await.unwrap().is_none());

        store.set("oves-sessions", "[]").await.unwrap();
        assert_eq!(store.get("oves-sessions").await.unwrap().unwrap(), "[]");

        store.set("oves-sessions", "[1]").await.unwrap();
        assert_eq!(store.get("oves-sessions").await.unwrap().unwrap(), "[1]");

        store.remove("oves-sessions").await.unwrap();
        assert!(store.get("oves-sessions").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_remove_absent_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();
        store.remove("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileKeyValueStore::new(dir.path()).unwrap();
            store.set("oves-current-session", "{\"id\":\"x\"}").await.unwrap();
        }
        let reopened = FileKeyValueStore::new(dir.path()).unwrap();
        assert_eq!(
            reopened.get("oves-current-session").await.unwrap().unwrap(),
            "{\"id\":\"x\"}"
        );
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryKeyValueStore::new();
        assert!(store.get("k").await.unwrap().is_none());
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), "v");
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }
}
