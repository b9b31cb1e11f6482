// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted per-recipient greeting record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use herald_core::{HeraldError, RecipientId};

const GREETING_FILE: &str = "greetings.json";

/// Last-greeted timestamps keyed by recipient, persisted as a JSON map of
/// id to RFC 3339 timestamp.
///
/// The session engine consults this before sending a greeting and records
/// the new timestamp afterwards; mutations rewrite the file in full under
/// the lock, same discipline as [`crate::DirectoryStore`].
pub struct GreetingStore {
    path: PathBuf,
    inner: Mutex<HashMap<RecipientId, DateTime<Utc>>>,
}

impl GreetingStore {
    /// Open the greeting record under `data_dir`, starting empty if no file
    /// exists yet.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, HeraldError> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(HeraldError::store)?;
        let path = data_dir.join(GREETING_FILE);

        let entries: HashMap<RecipientId, DateTime<Utc>> =
            match crate::file::read_if_present(&path).await? {
                Some(bytes) => {
                    let raw: HashMap<String, DateTime<Utc>> =
                        serde_json::from_slice(&bytes).map_err(HeraldError::store)?;
                    raw.into_iter().map(|(k, v)| (RecipientId(k), v)).collect()
                }
                None => HashMap::new(),
            };

        debug!(count = entries.len(), path = %path.display(), "greeting record loaded");
        Ok(Self {
            path,
            inner: Mutex::new(entries),
        })
    }

    /// When `id` was last greeted, if ever.
    pub async fn last_greeted(&self, id: &RecipientId) -> Option<DateTime<Utc>> {
        self.inner.lock().await.get(id).copied()
    }

    /// Record that `id` was greeted at `when`, replacing any earlier entry.
    pub async fn record(&self, id: RecipientId, when: DateTime<Utc>) -> Result<(), HeraldError> {
        let mut entries = self.inner.lock().await;
        entries.insert(id, when);
        self.persist(&entries).await
    }

    async fn persist(
        &self,
        entries: &HashMap<RecipientId, DateTime<Utc>>,
    ) -> Result<(), HeraldError> {
        // BTreeMap ordering keeps the file diffable across rewrites.
        let ordered: std::collections::BTreeMap<&str, &DateTime<Utc>> = entries
            .iter()
            .map(|(id, when)| (id.as_str(), when))
            .collect();
        let json = serde_json::to_vec_pretty(&ordered).map_err(HeraldError::store)?;
        crate::file::write_atomic(&self.path, &json).await
    }
}
