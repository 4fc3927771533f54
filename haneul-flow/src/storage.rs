use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{FlowError, Result};

/// Trait for the durable key-value slots the session flag lives in
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>>;
    async fn write(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage
#[derive(Clone, Default)]
pub struct InMemorySessionStorage {
    slots: Arc<DashMap<String, String>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).map(|entry| entry.clone()))
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        self.slots.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

/// File-backed SessionStorage. All slots are kept in one JSON object so the
/// flag survives process restarts the way browser storage survives reloads.
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(slots) => Ok(slots),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Unreadable session file, treating as empty"
                    );
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a sibling temp file and renames it over the target, so readers
    /// never see a partial file.
    async fn store(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;
        let bytes = serde_json::to_vec_pretty(slots)?;
        let target = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut file = tempfile::NamedTempFile::new_in(&dir)?;
            file.write_all(&bytes)?;
            file.as_file().sync_all()?;
            file.persist(&target).map_err(|e| FlowError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| FlowError::Storage(e.to_string()))??;
        debug!(path = %self.path.display(), slots = slots.len(), "Session slots written");
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut slots = self.load().await?;
        slots.insert(key.to_string(), value);
        self.store(&slots).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut slots = self.load().await?;
        if slots.remove(key).is_some() {
            self.store(&slots).await?;
        }
        Ok(())
    }
}

/// The session flag: one slot in a [`SessionStorage`], present and non-empty
/// while the user is signed in.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn get(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .read(&self.key)
            .await?
            .filter(|value| !value.is_empty()))
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.get().await?.is_some())
    }

    /// Mark the user as signed in with a fresh opaque token.
    pub async fn establish(&self) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        self.storage.write(&self.key, token.clone()).await?;
        debug!(key = %self.key, "Session flag set");
        Ok(token)
    }

    pub async fn set(&self, value: impl Into<String>) -> Result<()> {
        self.storage.write(&self.key, value.into()).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.remove(&self.key).await?;
        debug!(key = %self.key, "Session flag cleared");
        Ok(())
    }
}
