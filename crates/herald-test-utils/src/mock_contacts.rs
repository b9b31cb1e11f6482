// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock contact source with a fixed in-memory contact list.

use async_trait::async_trait;

use herald_core::{ContactFilter, ContactSource, HeraldError, RecipientId};

/// A contact source backed by a fixed `(id, category)` list.
pub struct MockContacts {
    contacts: Vec<(RecipientId, String)>,
}

impl MockContacts {
    /// Create a source from `(id, category)` pairs, kept in the given order.
    pub fn new(contacts: Vec<(&str, &str)>) -> Self {
        Self {
            contacts: contacts
                .into_iter()
                .map(|(id, cat)| (RecipientId::new(id), cat.to_string()))
                .collect(),
        }
    }

    /// A source that resolves every filter to an empty list.
    pub fn empty() -> Self {
        Self {
            contacts: Vec::new(),
        }
    }
}

#[async_trait]
impl ContactSource for MockContacts {
    async fn resolve(&self, filter: &ContactFilter) -> Result<Vec<RecipientId>, HeraldError> {
        let ids = self
            .contacts
            .iter()
            .filter(|(_, category)| match filter {
                ContactFilter::All => true,
                ContactFilter::Category(wanted) => category.eq_ignore_ascii_case(wanted),
            })
            .map(|(id, _)| id.clone())
            .collect();
        Ok(ids)
    }
}
