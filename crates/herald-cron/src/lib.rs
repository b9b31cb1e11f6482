// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven liveness sweeps.
//!
//! [`SweepScheduler`] wakes at each occurrence of a configured cron
//! expression, probes every directory entry through the reliable sender
//! and prunes the ones whose account is gone. The schedule is evaluated
//! against wall-clock UTC, so a gateway restarted mid-interval simply
//! waits for the next occurrence instead of replaying missed ones.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;
use herald_config::model::SweepConfig;
use herald_core::error::HeraldError;
use herald_resilience::ReliableSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs directory health sweeps on a cron schedule.
pub struct SweepScheduler {
    schedule: Cron,
    sender: Arc<ReliableSender>,
}

impl fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepScheduler")
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

impl SweepScheduler {
    /// Parses the configured cron expression and builds a scheduler.
    ///
    /// Fails with a config error when the expression does not parse, so
    /// a typo surfaces at startup rather than as a sweep that never
    /// fires.
    pub fn new(config: &SweepConfig, sender: Arc<ReliableSender>) -> Result<Self, HeraldError> {
        let schedule = Cron::from_str(&config.schedule)
            .map_err(|e| HeraldError::Config(format!("invalid sweep schedule: {e}")))?;
        Ok(Self { schedule, sender })
    }

    /// Time until the next scheduled sweep, measured from `now`.
    fn delay_until_next(&self, now: DateTime<Utc>) -> Option<Duration> {
        let next = self.schedule.find_next_occurrence(&now, false).ok()?;
        next.signed_duration_since(now).to_std().ok()
    }

    /// Sleeps until each occurrence and runs a sweep, until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            let Some(wait) = self.delay_until_next(Utc::now()) else {
                warn!("sweep schedule has no upcoming occurrence, scheduler exiting");
                return;
            };
            debug!(wait_secs = wait.as_secs(), "next sweep scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    let report = self.sender.health_sweep().await;
                    info!(
                        checked = report.checked,
                        pruned = report.pruned,
                        "directory sweep finished"
                    );
                }
                _ = cancel.cancelled() => {
                    info!("sweep scheduler shutting down");
                    return;
                }
            }
        }
    }
}
