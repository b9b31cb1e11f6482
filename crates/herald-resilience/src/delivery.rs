// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrying delivery with liveness probing and directory pruning.
//!
//! [`ReliableSender`] wraps the transport's send and probe capabilities with
//! the gateway's best-effort policy: failures are absorbed, retried within a
//! fixed ceiling, and recipients that stay unreachable are pruned from the
//! directory rather than surfaced as errors.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use herald_core::{HeraldError, OutboundPart, RecipientId, Transport};
use herald_store::DirectoryStore;

/// Retry ceiling and backoff for one delivery.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    /// Total attempts per recipient, including the first. At least 1.
    pub attempts: u32,
    /// Wait between failed attempts.
    pub backoff: Duration,
}

impl DeliveryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Outcome of one liveness sweep over the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries probed.
    pub checked: usize,
    /// Entries removed as unreachable.
    pub pruned: usize,
}

/// Transport send/probe wrapped with retry, backoff, and pruning.
pub struct ReliableSender {
    transport: Arc<dyn Transport>,
    directory: Arc<DirectoryStore>,
    policy: DeliveryPolicy,
}

impl ReliableSender {
    pub fn new(
        transport: Arc<dyn Transport>,
        directory: Arc<DirectoryStore>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            transport,
            directory,
            policy,
        }
    }

    /// Whether the transport considers `recipient` reachable.
    ///
    /// Any probe error counts as "not alive".
    pub async fn is_alive(&self, recipient: &RecipientId) -> bool {
        match self.transport.probe(recipient).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!(target = %recipient, error = %e, "probe failed, treating as not alive");
                false
            }
        }
    }

    /// Deliver `text` to `recipient`, retrying within the policy ceiling.
    ///
    /// Waits the backoff between failed attempts. When every attempt fails
    /// the recipient is pruned from the directory and `false` is returned;
    /// nothing is propagated to the caller.
    pub async fn send_with_retry(&self, recipient: &RecipientId, text: &str) -> bool {
        let part = OutboundPart::Text(text.to_string());
        for attempt in 1..=self.policy.attempts {
            match self.transport.send(recipient, &part).await {
                Ok(()) => {
                    if attempt > 1 {
                        debug!(target = %recipient, attempt, "delivery recovered on retry");
                    }
                    return true;
                }
                Err(e) => {
                    warn!(
                        target = %recipient,
                        attempt,
                        max_attempts = self.policy.attempts,
                        error = %e,
                        "delivery attempt failed"
                    );
                    if attempt < self.policy.attempts {
                        sleep(self.policy.backoff).await;
                    }
                }
            }
        }

        // Every attempt failed: this recipient is unreachable, drop it.
        if let Err(e) = self.prune_recipient(recipient).await {
            warn!(target = %recipient, error = %e, "failed to prune after delivery failure");
        }
        false
    }

    /// Remove `recipient` from the directory and persist the change.
    ///
    /// Idempotent: pruning an id that is already gone succeeds. Returns
    /// whether an entry was actually removed.
    pub async fn prune_recipient(&self, recipient: &RecipientId) -> Result<bool, HeraldError> {
        let removed = self.directory.remove(recipient).await?;
        if removed {
            info!(target = %recipient, "pruned unreachable recipient");
        }
        Ok(removed)
    }

    /// Probe every directory entry and prune the unreachable ones.
    ///
    /// Iterates a snapshot, not the live set, since pruning mutates the
    /// directory during the walk.
    pub async fn health_sweep(&self) -> SweepReport {
        let snapshot = self.directory.snapshot().await;
        let checked = snapshot.len();
        let mut pruned = 0usize;

        for recipient in snapshot {
            if self.is_alive(&recipient).await {
                continue;
            }
            match self.prune_recipient(&recipient).await {
                Ok(true) => pruned += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(target = %recipient, error = %e, "failed to prune during sweep");
                }
            }
        }

        info!(checked, pruned, "liveness sweep complete");
        SweepReport { checked, pruned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tempfile::tempdir;

    use herald_core::TransportEvent;
    use herald_test_utils::MockTransport;

    fn rid(s: &str) -> RecipientId {
        RecipientId::new(s)
    }

    async fn seeded_directory(dir: &std::path::Path, ids: &[&str]) -> Arc<DirectoryStore> {
        let store = DirectoryStore::open(dir).await.unwrap();
        for id in ids {
            store.insert(rid(id)).await.unwrap();
        }
        Arc::new(store)
    }

    /// Fails the first `fail_first` sends, then succeeds, counting attempts.
    struct FlakyTransport {
        fail_first: u32,
        attempts: AtomicU32,
    }

    impl FlakyTransport {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                attempts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        fn is_connected(&self) -> bool {
            true
        }

        async fn send(&self, _: &RecipientId, _: &OutboundPart) -> Result<(), HeraldError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_first {
                Err(HeraldError::Transport {
                    message: format!("induced failure on attempt {attempt}"),
                    source: None,
                })
            } else {
                Ok(())
            }
        }

        async fn probe(&self, _: &RecipientId) -> Result<bool, HeraldError> {
            Ok(true)
        }

        async fn next_event(&self) -> Result<TransportEvent, HeraldError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn first_attempt_success_sends_once() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &["a@c.us"]).await;
        let transport = Arc::new(MockTransport::new());
        let sender = ReliableSender::new(transport.clone(), directory.clone(), DeliveryPolicy::default());

        assert!(sender.send_with_retry(&rid("a@c.us"), "hello").await);
        assert_eq!(transport.sent_count().await, 1);
        assert!(directory.contains(&rid("a@c.us")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_after_transient_failure() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &["a@c.us"]).await;
        let transport = Arc::new(FlakyTransport::new(1));
        let sender = ReliableSender::new(transport.clone(), directory.clone(), DeliveryPolicy::default());

        assert!(sender.send_with_retry(&rid("a@c.us"), "hello").await);
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 2);
        // Recovered delivery must not prune.
        assert!(directory.contains(&rid("a@c.us")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_prune_and_return_false() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &["a@c.us", "b@c.us"]).await;
        let transport = Arc::new(FlakyTransport::new(u32::MAX));
        let sender = ReliableSender::new(transport.clone(), directory.clone(), DeliveryPolicy::default());

        assert!(!sender.send_with_retry(&rid("a@c.us"), "hello").await);
        // Exactly the policy ceiling, no more.
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 2);
        assert!(!directory.contains(&rid("a@c.us")).await);
        assert!(directory.contains(&rid("b@c.us")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_between_attempts() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &["a@c.us"]).await;
        let transport = Arc::new(FlakyTransport::new(1));
        let policy = DeliveryPolicy::new(2, Duration::from_secs(2));
        let sender = ReliableSender::new(transport, directory, policy);

        let start = tokio::time::Instant::now();
        assert!(sender.send_with_retry(&rid("a@c.us"), "hello").await);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn is_alive_treats_probe_errors_as_dead() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &[]).await;
        let transport = Arc::new(MockTransport::new());
        transport.mark_dead(rid("dead@c.us")).await;
        transport.fail_probe_for(rid("broken@c.us")).await;
        let sender = ReliableSender::new(transport, directory, DeliveryPolicy::default());

        assert!(sender.is_alive(&rid("fine@c.us")).await);
        assert!(!sender.is_alive(&rid("dead@c.us")).await);
        assert!(!sender.is_alive(&rid("broken@c.us")).await);
    }

    #[tokio::test]
    async fn prune_is_idempotent() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &["a@c.us"]).await;
        let transport = Arc::new(MockTransport::new());
        let sender = ReliableSender::new(transport, directory.clone(), DeliveryPolicy::default());

        assert!(sender.prune_recipient(&rid("a@c.us")).await.unwrap());
        assert!(!sender.prune_recipient(&rid("a@c.us")).await.unwrap());
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn health_sweep_prunes_exactly_the_dead() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &["a@c.us", "b@c.us", "c@c.us"]).await;
        let transport = Arc::new(MockTransport::new());
        transport.mark_dead(rid("b@c.us")).await;
        // Probe errors count as dead too.
        transport.fail_probe_for(rid("c@c.us")).await;
        let sender = ReliableSender::new(transport, directory.clone(), DeliveryPolicy::default());

        let report = sender.health_sweep().await;
        assert_eq!(report, SweepReport { checked: 3, pruned: 2 });
        assert!(directory.contains(&rid("a@c.us")).await);
        assert!(!directory.contains(&rid("b@c.us")).await);
        assert!(!directory.contains(&rid("c@c.us")).await);
    }

    #[tokio::test]
    async fn health_sweep_on_empty_directory_reports_zeroes() {
        let dir = tempdir().unwrap();
        let directory = seeded_directory(dir.path(), &[]).await;
        let transport = Arc::new(MockTransport::new());
        let sender = ReliableSender::new(transport, directory, DeliveryPolicy::default());

        let report = sender.health_sweep().await;
        assert_eq!(report, SweepReport { checked: 0, pruned: 0 });
    }
}
