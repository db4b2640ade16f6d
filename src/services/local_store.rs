//! Durable client-side key-value store and the local fallback tier on top
//! of it.
//!
//! Each entity collection lives under one key as a single JSON array and is
//! read, modified and written back whole on every mutation. Two in-flight
//! mutations of the same collection can interleave; the later write wins.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{StoreError, TierResult};
use crate::models::entity::EntityKind;
use crate::services::seed;
use crate::services::tier::{self, Tier};

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, used in tests and when no directory is configured
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Last tier of the chain: collections persisted in a [`KeyValueStore`],
/// seeded with default records the first time a collection is read
pub struct LocalTier {
    store: Arc<dyn KeyValueStore>,
}

impl LocalTier {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Forget every collection; the next access seeds again
    pub async fn reset(&self) -> Result<(), StoreError> {
        for kind in EntityKind::ALL {
            self.store.remove(kind.collection()).await?;
        }
        Ok(())
    }

    async fn load(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        let key = kind.collection();
        match self.store.read(key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
            None => {
                let records = seed::local_records(kind, Utc::now());
                info!(entity = %kind, count = records.len(), "Seeding local store");
                self.save(kind, &records).await?;
                Ok(records)
            }
        }
    }

    async fn save(&self, kind: EntityKind, records: &[Value]) -> Result<(), StoreError> {
        let key = kind.collection();
        let raw = serde_json::to_string(records).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.store.write(key, &raw).await?;
        debug!(entity = %kind, count = records.len(), "Local store written");
        Ok(())
    }
}

#[async_trait]
impl Tier for LocalTier {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list(&self, kind: EntityKind) -> TierResult<Vec<Value>> {
        Ok(self.load(kind).await?)
    }

    async fn get(&self, kind: EntityKind, id: &str) -> TierResult<Value> {
        let records = self.load(kind).await?;
        tier::find_record(kind, &records, id)
    }

    async fn insert(&self, kind: EntityKind, record: Value) -> TierResult<Value> {
        let mut records = self.load(kind).await?;
        let stored = tier::insert_record(kind, &mut records, record)?;
        self.save(kind, &records).await?;
        Ok(stored)
    }

    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> TierResult<Value> {
        let mut records = self.load(kind).await?;
        let merged = tier::merge_record(kind, &mut records, id, &patch)?;
        self.save(kind, &records).await?;
        Ok(merged)
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> TierResult<()> {
        let mut records = self.load(kind).await?;
        tier::remove_record(kind, &mut records, id)?;
        self.save(kind, &records).await?;
        Ok(())
    }
}
