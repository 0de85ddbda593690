// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Persisted queue storage
//!
//! The queue is a single ordered JSON array stored under a fixed key. Every
//! load returns it in insertion order and every save replaces it whole.
//!
//! - [`FileStore`] keeps it in `<dir>/pending_actions.json`, replaced by
//!   rename so readers never see a half-written file.
//! - [`MemoryStore`] keeps it for the life of the process.
//! - [`NullStore`] stands in for hosts without durable storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::action::QueuedAction;
use crate::error::StoreError;

/// Fixed key under which the queue is persisted
pub const QUEUE_KEY: &str = "pending_actions";

/// Per-process sequence keeping sibling file names unique across stores
/// that share a directory
static SIBLING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Storage backend for the pending action sequence
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Read the whole queue, oldest first
    async fn load(&self) -> Result<Vec<QueuedAction>, StoreError>;

    /// Replace the whole queue
    async fn save(&self, actions: &[QueuedAction]) -> Result<(), StoreError>;

    /// Whether queued actions outlive the process. Background draining is
    /// only started for durable stores.
    fn is_durable(&self) -> bool {
        true
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store the queue in `dir`, using the fixed queue key as file name
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", QUEUE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        io_error(&self.path, source)
    }

    /// `<path>.<tag>-<suffix>-<seq>`, never reused within this process
    fn sibling(&self, tag: &str, suffix: impl std::fmt::Display) -> PathBuf {
        let seq = SIBLING_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}-{}-{}", tag, suffix, seq));
        PathBuf::from(name)
    }

    /// Move an unreadable queue file out of the way so the next save does
    /// not overwrite it.
    async fn quarantine(&self) -> Option<PathBuf> {
        let target = self.sibling("corrupt", chrono::Utc::now().timestamp_millis());

        match tokio::fs::rename(&self.path, &target).await {
            Ok(()) => Some(target),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to quarantine corrupt queue file"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ActionStore for FileStore {
    async fn load(&self) -> Result<Vec<QueuedAction>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&content) {
            Ok(actions) => Ok(actions),
            Err(source) => {
                let quarantined = self.quarantine().await;
                Err(StoreError::Corrupt {
                    path: self.path.clone(),
                    quarantined,
                    source,
                })
            }
        }
    }

    async fn save(&self, actions: &[QueuedAction]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let content = serde_json::to_vec(actions)?;

        // Unique per save; other stores may share this directory
        let tmp = self.sibling("tmp", std::process::id());

        if let Err(e) = tokio::fs::write(&tmp, &content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.io_error(e));
        }

        debug!(path = %self.path.display(), count = actions.len(), "Saved queue");
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    actions: Mutex<Vec<QueuedAction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `actions`
    pub fn with_actions(actions: Vec<QueuedAction>) -> Self {
        Self {
            actions: Mutex::new(actions),
        }
    }
}

#[async_trait]
impl ActionStore for MemoryStore {
    async fn load(&self) -> Result<Vec<QueuedAction>, StoreError> {
        Ok(self.actions.lock().await.clone())
    }

    async fn save(&self, actions: &[QueuedAction]) -> Result<(), StoreError> {
        *self.actions.lock().await = actions.to_vec();
        Ok(())
    }
}

/// Store for hosts with no durable local storage: always empty, saves are
/// dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl ActionStore for NullStore {
    async fn load(&self) -> Result<Vec<QueuedAction>, StoreError> {
        Ok(Vec::new())
    }

    async fn save(&self, _actions: &[QueuedAction]) -> Result<(), StoreError> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn action(n: u64) -> QueuedAction {
        QueuedAction::new(format!("/api/tickets/{}", n), json!({ "id": n }))
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());

        assert!(store.load().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_file_round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        let actions = vec![action(3), action(1), action(2)];

        store.save(&actions).await.unwrap();

        assert_eq!(store.load().await.unwrap(), actions);
        assert!(store.path().ends_with("pending_actions.json"));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        let first = action(1);
        let second = action(2);

        store.save(&[first, second.clone()]).await.unwrap();
        store.save(std::slice::from_ref(&second)).await.unwrap();

        assert_eq!(store.load().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_save_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::in_dir(&nested);

        store.save(&[action(1)]).await.unwrap();

        assert_eq!(store.load().await.unwrap().len(), 1);
        // No temporary files are left behind
        let entries: Vec<_> = std::fs::read_dir(&nested).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_quarantined() {
        let dir = tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        std::fs::write(store.path(), b"{not json").unwrap();

        let err = store.load().await.unwrap_err();
        let quarantined = match err {
            StoreError::Corrupt { quarantined, .. } => quarantined.unwrap(),
            other => panic!("unexpected error: {other}"),
        };

        assert!(!store.path().exists());
        assert_eq!(std::fs::read(&quarantined).unwrap(), b"{not json");
        // Afterwards the queue starts over empty
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_corruption_keeps_every_quarantined_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());

        let mut kept = Vec::new();
        for content in ["{first", "{second"] {
            std::fs::write(store.path(), content).unwrap();
            match store.load().await.unwrap_err() {
                StoreError::Corrupt { quarantined, .. } => kept.push(quarantined.unwrap()),
                other => panic!("unexpected error: {other}"),
            }
        }

        assert_ne!(kept[0], kept[1]);
        assert_eq!(std::fs::read(&kept[0]).unwrap(), b"{first");
        assert_eq!(std::fs::read(&kept[1]).unwrap(), b"{second");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_from_two_stores_on_one_directory() {
        let dir = tempdir().unwrap();
        let left = std::sync::Arc::new(FileStore::in_dir(dir.path()));
        let right = std::sync::Arc::new(FileStore::in_dir(dir.path()));

        for round in 0..100 {
            let a = {
                let store = left.clone();
                tokio::spawn(async move { store.save(&[action(round)]).await })
            };
            let b = {
                let store = right.clone();
                tokio::spawn(async move { store.save(&[action(round + 1000)]).await })
            };

            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();
        }

        // Last writer wins, but the file is always whole and nothing is left over
        assert_eq!(left.load().await.unwrap().len(), 1);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        std::fs::write(store.path(), b"  \n").unwrap();

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::with_actions(vec![action(1)]);
        assert_eq!(store.load().await.unwrap().len(), 1);

        store.save(&[]).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
        assert!(store.is_durable());
    }

    #[tokio::test]
    async fn test_null_store_drops_everything() {
        let store = NullStore;
        store.save(&[action(1)]).await.unwrap();

        assert!(store.load().await.unwrap().is_empty());
        assert!(!store.is_durable());
    }
}
