// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval pacing for outbound dispatch loops.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// A fixed-interval ticker consumed between consecutive sends.
///
/// Unlike a default `tokio::time::interval`, the first call to [`pace`]
/// completes only after one full period, so a loop that paces after each
/// item never fires back-to-back. When loop work overruns the period, the
/// next tick fires immediately and the cadence re-anchors from there
/// (`MissedTickBehavior::Delay`), which keeps the spacing between sends at
/// least close to the period instead of bursting to catch up.
///
/// [`pace`]: Pacer::pace
pub struct Pacer {
    interval: Interval,
}

impl Pacer {
    /// Create a pacer that ticks every `period`.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next tick.
    pub async fn pace(&mut self) {
        self.interval.tick().await;
    }
}
