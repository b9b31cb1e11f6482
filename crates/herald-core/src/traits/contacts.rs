// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact source trait for resolving broadcast target lists.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{ContactFilter, RecipientId};

/// Resolves a filter to an ordered list of broadcast targets.
///
/// Sources may be backed by a spreadsheet/CSV, a database, or nothing at all;
/// an unconfigured source resolves every filter to an empty list rather than
/// erroring.
#[async_trait]
pub trait ContactSource: Send + Sync {
    /// Returns the recipients matching `filter`, in source order.
    async fn resolve(&self, filter: &ContactFilter) -> Result<Vec<RecipientId>, HeraldError>;
}
