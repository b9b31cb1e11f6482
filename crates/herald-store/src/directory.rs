// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted recipient directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use herald_core::{HeraldError, RecipientId};

const DIRECTORY_FILE: &str = "directory.json";

/// Set of recipients considered subscribed, persisted as a JSON array.
///
/// The in-memory set is the source of truth; every mutation rewrites the
/// file in full before the lock is released, so concurrent writers (the
/// session engine adding new contacts, the reliability subsystem pruning
/// dead ones) serialize on the mutex and never observe a stale file.
pub struct DirectoryStore {
    path: PathBuf,
    inner: Mutex<HashSet<RecipientId>>,
}

impl DirectoryStore {
    /// Open the directory under `data_dir`, creating the directory tree and
    /// starting empty if no file exists yet.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, HeraldError> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(HeraldError::store)?;
        let path = data_dir.join(DIRECTORY_FILE);

        let entries: HashSet<RecipientId> = match crate::file::read_if_present(&path).await? {
            Some(bytes) => {
                let ids: Vec<String> =
                    serde_json::from_slice(&bytes).map_err(HeraldError::store)?;
                ids.into_iter().map(RecipientId).collect()
            }
            None => HashSet::new(),
        };

        debug!(count = entries.len(), path = %path.display(), "directory loaded");
        Ok(Self {
            path,
            inner: Mutex::new(entries),
        })
    }

    /// Whether `id` is currently in the directory.
    pub async fn contains(&self, id: &RecipientId) -> bool {
        self.inner.lock().await.contains(id)
    }

    /// Add `id`. Returns `true` when it was newly added; an id already
    /// present leaves the file untouched.
    pub async fn insert(&self, id: RecipientId) -> Result<bool, HeraldError> {
        let mut entries = self.inner.lock().await;
        if !entries.insert(id) {
            return Ok(false);
        }
        self.persist(&entries).await?;
        Ok(true)
    }

    /// Remove `id`. Idempotent: removing an absent id succeeds without
    /// touching the file. Returns `true` when an entry was removed.
    pub async fn remove(&self, id: &RecipientId) -> Result<bool, HeraldError> {
        let mut entries = self.inner.lock().await;
        if !entries.remove(id) {
            return Ok(false);
        }
        self.persist(&entries).await?;
        Ok(true)
    }

    /// A sorted snapshot of the current entries.
    ///
    /// Sweeps and admin broadcasts iterate this copy, not the live set,
    /// since they prune entries while iterating.
    pub async fn snapshot(&self) -> Vec<RecipientId> {
        let entries = self.inner.lock().await;
        let mut ids: Vec<RecipientId> = entries.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    async fn persist(&self, entries: &HashSet<RecipientId>) -> Result<(), HeraldError> {
        // Sorted output keeps the file diffable across rewrites.
        let mut ids: Vec<&str> = entries.iter().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        let json = serde_json::to_vec_pretty(&ids).map_err(HeraldError::store)?;
        crate::file::write_atomic(&self.path, &json).await
    }
}
