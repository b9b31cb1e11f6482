// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pausable, cancellable bulk sends for the Herald gateway.
//!
//! The [`BroadcastController`] runs at most one broadcast job at a time:
//! - `start` snapshots the target list, spawns the job, and hands back a
//!   progress stream
//! - `pause` / `resume` / `stop` signal the running job through a watch
//!   channel; without a job they are no-ops
//! - the job honors control signals only at target boundaries, so an
//!   in-flight delivery always completes its attempts first

use std::sync::Arc;

use herald_core::error::HeraldError;
use herald_core::types::{BroadcastPayload, ProgressEvent, RecipientId};
use herald_core::Transport;
use herald_resilience::Pacer;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::Duration;
use tracing::{info, warn};

/// Pacing knobs for a broadcast job.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastSettings {
    /// Delay between consecutive targets.
    pub pace: Duration,
    /// How long a paused job sleeps before re-checking its run state.
    pub pause_poll: Duration,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            pace: Duration::from_millis(1500),
            pause_poll: Duration::from_millis(500),
        }
    }
}

/// Lifecycle state of the running job, published over a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Paused,
    Stopped,
}

/// Control handle for the active job. Present in the slot only while the
/// job task is alive.
struct JobHandle {
    control: watch::Sender<RunState>,
}

/// What a finished job reports before the terminal progress event goes out.
struct JobOutcome {
    sent: usize,
    failures: usize,
    error: Option<String>,
}

/// Coordinates bulk sends over a [`Transport`], one job at a time.
pub struct BroadcastController {
    transport: Arc<dyn Transport>,
    settings: BroadcastSettings,
    job: Arc<Mutex<Option<JobHandle>>>,
}

impl BroadcastController {
    pub fn new(transport: Arc<dyn Transport>, settings: BroadcastSettings) -> Self {
        Self {
            transport,
            settings,
            job: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts a broadcast to `targets`, delivering every non-empty part of
    /// `payload` to each one.
    ///
    /// Returns a receiver that yields one [`ProgressEvent::Delivered`] per
    /// processed target and a final [`ProgressEvent::Done`]. Fails without
    /// side effects when the transport is offline, the target list is empty,
    /// or another job is still active.
    pub async fn start(
        &self,
        targets: Vec<RecipientId>,
        payload: BroadcastPayload,
    ) -> Result<mpsc::Receiver<ProgressEvent>, HeraldError> {
        if !self.transport.is_connected() {
            return Err(HeraldError::NotConnected);
        }
        if targets.is_empty() {
            return Err(HeraldError::EmptyTargetSet);
        }

        let mut slot = self.job.lock().await;
        if slot.is_some() {
            return Err(HeraldError::AlreadyRunning);
        }

        let (control_tx, control_rx) = watch::channel(RunState::Running);
        // One slot per target plus the terminal event, so the job never
        // blocks on a slow or departed consumer.
        let (progress_tx, progress_rx) = mpsc::channel(targets.len() + 1);
        *slot = Some(JobHandle {
            control: control_tx,
        });
        drop(slot);

        info!(targets = targets.len(), "broadcast job starting");

        let transport = Arc::clone(&self.transport);
        let settings = self.settings;
        let job = Arc::clone(&self.job);
        tokio::spawn(async move {
            let total = targets.len();
            let outcome = run_job(
                transport,
                settings,
                targets,
                payload,
                control_rx,
                progress_tx.clone(),
            )
            .await;
            // Free the slot before the terminal event goes out, so a consumer
            // reacting to `Done` can start the next job right away.
            *job.lock().await = None;
            info!(
                sent = outcome.sent,
                total,
                failures = outcome.failures,
                "broadcast job finished"
            );
            let _ = progress_tx
                .send(ProgressEvent::Done {
                    sent: outcome.sent,
                    total,
                    error: outcome.error,
                })
                .await;
        });

        Ok(progress_rx)
    }

    /// Pauses the running job at its next target boundary. No-op when no job
    /// is active or the job is already stopping.
    pub async fn pause(&self) {
        let slot = self.job.lock().await;
        if let Some(handle) = slot.as_ref() {
            handle.control.send_if_modified(|state| {
                if *state == RunState::Running {
                    *state = RunState::Paused;
                    true
                } else {
                    false
                }
            });
        }
    }

    /// Resumes a paused job. No-op when no job is active, the job is already
    /// running, or it has been stopped.
    pub async fn resume(&self) {
        let slot = self.job.lock().await;
        if let Some(handle) = slot.as_ref() {
            handle.control.send_if_modified(|state| {
                if *state == RunState::Paused {
                    *state = RunState::Running;
                    true
                } else {
                    false
                }
            });
        }
    }

    /// Stops the running job; remaining targets are never attempted. No-op
    /// when no job is active.
    pub async fn stop(&self) {
        let slot = self.job.lock().await;
        if let Some(handle) = slot.as_ref() {
            let _ = handle.control.send(RunState::Stopped);
        }
    }

    /// Whether a job currently occupies the single-flight slot.
    pub async fn is_active(&self) -> bool {
        self.job.lock().await.is_some()
    }
}

async fn run_job(
    transport: Arc<dyn Transport>,
    settings: BroadcastSettings,
    targets: Vec<RecipientId>,
    payload: BroadcastPayload,
    mut control: watch::Receiver<RunState>,
    progress: mpsc::Sender<ProgressEvent>,
) -> JobOutcome {
    let total = targets.len();
    let parts = payload.parts();
    let mut pacer = Pacer::new(settings.pace);
    let mut sent = 0usize;
    let mut failures = 0usize;
    let mut error = None;

    'targets: for (index, target) in targets.iter().enumerate() {
        // Control signals take effect here, between targets.
        loop {
            let state = *control.borrow_and_update();
            match state {
                RunState::Stopped => {
                    info!(sent, total, "broadcast stopped");
                    break 'targets;
                }
                RunState::Paused => {
                    let _ = tokio::time::timeout(settings.pause_poll, control.changed()).await;
                }
                RunState::Running => break,
            }
        }

        if !transport.is_connected() {
            warn!(sent, total, "transport went offline, aborting broadcast");
            error = Some("transport disconnected mid-broadcast".to_string());
            break 'targets;
        }

        // Each part is attempted independently; one failed part does not
        // keep the rest of the payload from going out.
        let mut success = true;
        for part in &parts {
            if let Err(e) = transport.send(target, part).await {
                warn!(
                    target = %target,
                    part = part.kind(),
                    error = %e,
                    "broadcast delivery failed"
                );
                success = false;
            }
        }
        if !success {
            failures += 1;
        }
        sent += 1;

        let _ = progress
            .send(ProgressEvent::Delivered {
                sent,
                total,
                target: target.clone(),
                success,
            })
            .await;

        if index + 1 < total {
            pacer.pace().await;
        }
    }

    JobOutcome {
        sent,
        failures,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use herald_core::types::{DocumentAttachment, ImageAttachment};
    use herald_test_utils::MockTransport;
    use proptest::prelude::*;

    fn quick() -> BroadcastSettings {
        BroadcastSettings::default()
    }

    fn targets(n: usize) -> Vec<RecipientId> {
        (0..n)
            .map(|i| RecipientId::new(format!("user{i}@c.us")))
            .collect()
    }

    fn text_payload(message: &str) -> BroadcastPayload {
        BroadcastPayload {
            text: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn full_payload() -> BroadcastPayload {
        BroadcastPayload {
            text: Some("launch day".to_string()),
            image: Some(ImageAttachment {
                data: vec![0xde, 0xad],
                caption: Some("poster".to_string()),
            }),
            document: Some(DocumentAttachment {
                data: vec![0xbe, 0xef],
                caption: None,
                file_name: "brochure.pdf".to_string(),
            }),
        }
    }

    /// Receives events until the terminal one arrives.
    async fn drain(mut rx: mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = matches!(event, ProgressEvent::Done { .. });
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_every_part_to_every_target_in_order() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport.clone(), quick());
        let ids = targets(2);

        let rx = controller
            .start(ids.clone(), full_payload())
            .await
            .unwrap();
        let events = drain(rx).await;

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ProgressEvent::Delivered {
                sent: 1,
                total: 2,
                target: ids[0].clone(),
                success: true,
            }
        );
        assert_eq!(
            events[1],
            ProgressEvent::Delivered {
                sent: 2,
                total: 2,
                target: ids[1].clone(),
                success: true,
            }
        );
        assert_eq!(
            events[2],
            ProgressEvent::Done {
                sent: 2,
                total: 2,
                error: None,
            }
        );

        for id in &ids {
            let kinds: Vec<&str> = transport
                .sent_to(id)
                .await
                .iter()
                .map(|p| p.kind())
                .collect();
            assert_eq!(kinds, vec!["text", "image", "document"]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_targets_are_reported_without_aborting() {
        let transport = Arc::new(MockTransport::new());
        let ids = targets(4);
        transport.fail_sends_to(ids[1].clone()).await;
        transport.fail_sends_to(ids[3].clone()).await;

        let controller = BroadcastController::new(transport.clone(), quick());
        let rx = controller
            .start(ids.clone(), text_payload("hello"))
            .await
            .unwrap();
        let events = drain(rx).await;

        let flags: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Delivered { success, .. } => Some(*success),
                ProgressEvent::Done { .. } => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false, true, false]);
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Done {
                sent: 4,
                total: 4,
                error: None,
            })
        );
        // Healthy targets after a failure still got their copy.
        assert_eq!(transport.texts_to(&ids[2]).await, vec!["hello"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_skips_all_remaining_targets() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport.clone(), quick());
        let ids = targets(3);

        let mut rx = controller
            .start(ids.clone(), text_payload("halt me"))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, ProgressEvent::Delivered { sent: 1, .. }));
        controller.stop().await;

        let events = drain(rx).await;
        assert_eq!(
            events,
            vec![ProgressEvent::Done {
                sent: 1,
                total: 3,
                error: None,
            }]
        );
        assert!(transport.texts_to(&ids[1]).await.is_empty());
        assert!(transport.texts_to(&ids[2]).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_suspends_and_resume_continues() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport.clone(), quick());
        let ids = targets(3);

        let mut rx = controller
            .start(ids.clone(), text_payload("wave"))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, ProgressEvent::Delivered { sent: 1, .. }));
        controller.pause().await;

        // Nothing moves while paused.
        let idle = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await;
        assert!(idle.is_err());
        assert_eq!(transport.sent_count().await, 1);

        controller.resume().await;
        let events = drain(rx).await;
        assert_eq!(
            events,
            vec![
                ProgressEvent::Delivered {
                    sent: 2,
                    total: 3,
                    target: ids[1].clone(),
                    success: true,
                },
                ProgressEvent::Delivered {
                    sent: 3,
                    total: 3,
                    target: ids[2].clone(),
                    success: true,
                },
                ProgressEvent::Done {
                    sent: 3,
                    total: 3,
                    error: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn controls_without_a_job_are_noops() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport, quick());

        controller.pause().await;
        controller.resume().await;
        controller.stop().await;
        assert!(!controller.is_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_until_first_finishes() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport.clone(), quick());

        let rx = controller
            .start(targets(2), text_payload("one"))
            .await
            .unwrap();
        let rejected = controller.start(targets(1), text_payload("two")).await;
        assert!(matches!(rejected, Err(HeraldError::AlreadyRunning)));

        // The slot frees before the terminal event goes out, so a consumer
        // that saw `Done` can start again immediately.
        drain(rx).await;
        assert!(!controller.is_active().await);
        let rx = controller
            .start(targets(1), text_payload("two"))
            .await
            .unwrap();
        let events = drain(rx).await;
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::Done { sent: 1, .. })
        ));
    }

    #[tokio::test]
    async fn offline_transport_is_rejected_before_any_send() {
        let transport = Arc::new(MockTransport::new());
        transport.set_connected(false);
        let controller = BroadcastController::new(transport.clone(), quick());

        let result = controller.start(targets(2), text_payload("x")).await;
        assert!(matches!(result, Err(HeraldError::NotConnected)));
        assert!(!controller.is_active().await);
        assert_eq!(transport.sent_count().await, 0);
    }

    #[tokio::test]
    async fn empty_target_list_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport, quick());

        let result = controller.start(Vec::new(), text_payload("x")).await;
        assert!(matches!(result, Err(HeraldError::EmptyTargetSet)));
        assert!(!controller.is_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_mid_run_aborts_with_error() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport.clone(), quick());
        let ids = targets(3);

        let mut rx = controller
            .start(ids.clone(), text_payload("fragile"))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, ProgressEvent::Delivered { sent: 1, .. }));
        transport.set_connected(false);

        let events = drain(rx).await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            ProgressEvent::Done { sent, total, error } => {
                assert_eq!(*sent, 1);
                assert_eq!(*total, 3);
                assert!(error.is_some());
            }
            other => panic!("expected terminal event, got {other:?}"),
        }
        assert!(transport.texts_to(&ids[1]).await.is_empty());
        assert!(transport.texts_to(&ids[2]).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn paces_between_targets_but_not_after_the_last() {
        let transport = Arc::new(MockTransport::new());
        let controller = BroadcastController::new(transport, quick());

        let started = tokio::time::Instant::now();
        let rx = controller
            .start(targets(3), text_payload("tick"))
            .await
            .unwrap();
        drain(rx).await;

        // Two gaps for three targets, none after the final one.
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Every run yields one progress event per target plus a terminal
        /// event, with the failure count matching the unreachable targets.
        #[test]
        fn progress_stream_is_complete_for_any_failure_mix(
            n in 1usize..10,
            fail_mask in any::<u16>(),
        ) {
            let ids = targets(n);
            let failing: Vec<RecipientId> = ids
                .iter()
                .enumerate()
                .filter(|(i, _)| fail_mask & (1u16 << i) != 0)
                .map(|(_, id)| id.clone())
                .collect();
            let expected_failures = failing.len();

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();
            let events = rt.block_on({
                let ids = ids.clone();
                async move {
                    let transport = Arc::new(MockTransport::new());
                    for id in failing {
                        transport.fail_sends_to(id).await;
                    }
                    let controller = BroadcastController::new(transport, quick());
                    let rx = controller
                        .start(ids, text_payload("prop"))
                        .await
                        .unwrap();
                    drain(rx).await
                }
            });

            prop_assert_eq!(events.len(), n + 1);
            let failures = events
                .iter()
                .filter(|e| matches!(e, ProgressEvent::Delivered { success: false, .. }))
                .count();
            prop_assert_eq!(failures, expected_failures);
            match events.last() {
                Some(ProgressEvent::Done { sent, total, error }) => {
                    prop_assert_eq!(*sent, n);
                    prop_assert_eq!(*total, n);
                    prop_assert!(error.is_none());
                }
                other => prop_assert!(false, "missing terminal event: {:?}", other),
            }
        }
    }
}
