// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV-backed contact source.
//!
//! Reads a `id,category` CSV file into broadcast target lists. An
//! unconfigured or missing file resolves every filter to an empty list;
//! only unreadable or malformed files are errors.

use std::path::Path;

use async_trait::async_trait;
use herald_config::model::ContactsConfig;
use herald_core::error::HeraldError;
use herald_core::types::{ContactFilter, RecipientId};
use herald_core::ContactSource;
use serde::Deserialize;
use tracing::{debug, warn};

/// [`ContactSource`] over the configured CSV file.
pub struct CsvContactSource {
    config: ContactsConfig,
}

impl CsvContactSource {
    pub fn new(config: ContactsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ContactSource for CsvContactSource {
    async fn resolve(&self, filter: &ContactFilter) -> Result<Vec<RecipientId>, HeraldError> {
        let Some(path) = self.config.csv_path.as_deref() else {
            debug!("no contact csv configured, resolving to an empty list");
            return Ok(Vec::new());
        };
        read_rows(Path::new(path), filter)
    }
}

#[derive(Debug, Deserialize)]
struct ContactRow {
    id: String,
    #[serde(default)]
    category: String,
}

fn read_rows(path: &Path, filter: &ContactFilter) -> Result<Vec<RecipientId>, HeraldError> {
    if !path.exists() {
        warn!(path = %path.display(), "contact csv not found, resolving to an empty list");
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| HeraldError::ContactSource {
        message: format!("failed to open {}", path.display()),
        source: Some(Box::new(e)),
    })?;

    let mut recipients = Vec::new();
    for row in reader.deserialize::<ContactRow>() {
        let row = row.map_err(|e| HeraldError::ContactSource {
            message: format!("malformed row in {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        let keep = match filter {
            ContactFilter::All => true,
            ContactFilter::Category(category) => {
                row.category.trim().eq_ignore_ascii_case(category)
            }
        };
        if keep {
            recipients.push(RecipientId::new(row.id.trim()));
        }
    }
    Ok(recipients)
}
