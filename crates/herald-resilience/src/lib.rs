// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery reliability primitives for the Herald gateway.
//!
//! Provides the retrying sender with directory pruning, the liveness probe
//! and sweep, and the fixed-interval [`Pacer`] that dispatch loops consume
//! to respect transport rate limits.

pub mod delivery;
pub mod pacer;

pub use delivery::{DeliveryPolicy, ReliableSender, SweepReport};
pub use pacer::Pacer;
