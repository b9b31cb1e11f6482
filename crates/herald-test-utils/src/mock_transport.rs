// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `Transport` with injectable inbound events
//! and captured outbound parts for assertion in tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use herald_core::{HeraldError, InboundEvent, OutboundPart, RecipientId, Transport, TransportEvent};

/// A mock messaging transport for testing.
///
/// Provides two queues:
/// - **inbound**: Events injected via `inject_event()` are returned by `next_event()`
/// - **sent**: Parts passed to `send()` are captured and retrievable via `sent_messages()`
///
/// Per-recipient failure tables make sends fail or probes report dead/error,
/// so tests can force retry, prune, and best-effort paths.
pub struct MockTransport {
    inbound: Arc<Mutex<VecDeque<TransportEvent>>>,
    sent: Arc<Mutex<Vec<(RecipientId, OutboundPart)>>>,
    failing_sends: Arc<Mutex<HashSet<RecipientId>>>,
    dead_recipients: Arc<Mutex<HashSet<RecipientId>>>,
    failing_probes: Arc<Mutex<HashSet<RecipientId>>>,
    connected: AtomicBool,
    notify: Arc<Notify>,
}

impl MockTransport {
    /// Create a connected mock transport with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            failing_sends: Arc::new(Mutex::new(HashSet::new())),
            dead_recipients: Arc::new(Mutex::new(HashSet::new())),
            failing_probes: Arc::new(Mutex::new(HashSet::new())),
            connected: AtomicBool::new(true),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Inject an event into the inbound queue.
    ///
    /// The next call to `next_event()` will return it.
    pub async fn inject_event(&self, event: TransportEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Inject an inbound message event.
    pub async fn inject_message(&self, event: InboundEvent) {
        self.inject_event(TransportEvent::Message(event)).await;
    }

    /// All parts sent through `send()`, with their recipients, in order.
    pub async fn sent_messages(&self) -> Vec<(RecipientId, OutboundPart)> {
        self.sent.lock().await.clone()
    }

    /// Count of captured sends.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Parts sent to one recipient, in order.
    pub async fn sent_to(&self, recipient: &RecipientId) -> Vec<OutboundPart> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(r, _)| r == recipient)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Text parts sent to one recipient, in order.
    pub async fn texts_to(&self, recipient: &RecipientId) -> Vec<String> {
        self.sent_to(recipient)
            .await
            .into_iter()
            .filter_map(|p| match p {
                OutboundPart::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Clear all captured sends.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Make every send to `recipient` fail.
    pub async fn fail_sends_to(&self, recipient: RecipientId) {
        self.failing_sends.lock().await.insert(recipient);
    }

    /// Make sends to `recipient` succeed again.
    pub async fn restore_sends_to(&self, recipient: &RecipientId) {
        self.failing_sends.lock().await.remove(recipient);
    }

    /// Make probes report `recipient` as unreachable.
    pub async fn mark_dead(&self, recipient: RecipientId) {
        self.dead_recipients.lock().await.insert(recipient);
    }

    /// Make probes for `recipient` fail with a transport error.
    pub async fn fail_probe_for(&self, recipient: RecipientId) {
        self.failing_probes.lock().await.insert(recipient);
    }

    /// Flip the reported connection state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send(&self, recipient: &RecipientId, part: &OutboundPart) -> Result<(), HeraldError> {
        if !self.is_connected() {
            return Err(HeraldError::NotConnected);
        }
        if self.failing_sends.lock().await.contains(recipient) {
            return Err(HeraldError::Transport {
                message: format!("mock send failure for {recipient}"),
                source: None,
            });
        }
        self.sent
            .lock()
            .await
            .push((recipient.clone(), part.clone()));
        Ok(())
    }

    async fn probe(&self, recipient: &RecipientId) -> Result<bool, HeraldError> {
        if self.failing_probes.lock().await.contains(recipient) {
            return Err(HeraldError::Transport {
                message: format!("mock probe failure for {recipient}"),
                source: None,
            });
        }
        Ok(!self.dead_recipients.lock().await.contains(recipient))
    }

    async fn next_event(&self) -> Result<TransportEvent, HeraldError> {
        loop {
            // Try to pop from queue
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            // Wait for notification that a new event was injected
            self.notify.notified().await;
        }
    }
}
