// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-windowed deduplication of inbound event identifiers.
//!
//! Transports may redeliver an event after a reconnect; the engine must
//! process each event id at most once within the retention window. Expired
//! entries are swept lazily on insert, so the set needs no background task.

use std::collections::{HashSet, VecDeque};

use herald_core::types::EventId;
use tokio::time::{Duration, Instant};

/// Expiring set of recently processed event ids.
///
/// Entries are kept in arrival order in a queue alongside a lookup set;
/// anything older than the window is dropped from both the next time an
/// insert happens.
pub struct DedupWindow {
    window: Duration,
    entries: VecDeque<(Instant, EventId)>,
    seen: HashSet<EventId>,
}

impl DedupWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Records `id` as processed. Returns `false` if it was already present
    /// within the window, in which case the caller should discard the event.
    pub fn insert(&mut self, id: EventId) -> bool {
        self.sweep(Instant::now());
        if !self.seen.insert(id.clone()) {
            return false;
        }
        self.entries.push_back((Instant::now(), id));
        true
    }

    /// Entries currently retained.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn sweep(&mut self, now: Instant) {
        loop {
            match self.entries.front() {
                Some((at, _)) if now.duration_since(*at) >= self.window => {
                    if let Some((_, id)) = self.entries.pop_front() {
                        self.seen.remove(&id);
                    }
                }
                _ => break,
            }
        }
    }
}
