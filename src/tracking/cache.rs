//! Last-known-good snapshots for tracking views.
//!
//! The cache is written only after a successful fetch and read only to fill
//! the view while the store cannot be reached. It is never used to decide a write.

use crate::model::{Order, OrderId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Snapshot cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot cache encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// An order as last fetched, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    pub order: Order,
    pub fetched_at: DateTime<Utc>,
}

impl CachedSnapshot {
    pub fn now(order: Order) -> Self {
        Self {
            order,
            fetched_at: Utc::now(),
        }
    }

    /// Time since the snapshot was fetched.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.fetched_at
    }
}

#[async_trait]
pub trait SnapshotCache: Send + Sync + 'static {
    async fn load(&self, id: OrderId) -> Result<Option<CachedSnapshot>, CacheError>;
    async fn store(&self, snapshot: &CachedSnapshot) -> Result<(), CacheError>;
}

/// Process-local cache. Survives remounts of a view, not restarts.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<OrderId, CachedSnapshot>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn load(&self, id: OrderId) -> Result<Option<CachedSnapshot>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(entries.get(&id).cloned())
    }

    async fn store(&self, snapshot: &CachedSnapshot) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(snapshot.order.id, snapshot.clone());
        Ok(())
    }
}

/// One JSON file per order under a directory. Survives restarts.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, id: OrderId) -> PathBuf {
        self.dir.join(format!("order-{id}.json"))
    }
}

#[async_trait]
impl SnapshotCache for FileCache {
    async fn load(&self, id: OrderId) -> Result<Option<CachedSnapshot>, CacheError> {
        match tokio::fs::read(self.path(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, snapshot: &CachedSnapshot) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(snapshot)?;
        // Write then rename so a reader never sees half a snapshot.
        let path = self.path(snapshot.order.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
