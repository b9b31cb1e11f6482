// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport capability trait for the underlying messaging connection.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{OutboundPart, RecipientId, TransportEvent};

/// The messaging connection Herald multiplexes everything over.
///
/// Implementations own connecting, authenticating, and wire encoding; the
/// gateway core only sends parts, probes reachability, and consumes the
/// inbound event stream. All sends and probes may fail with
/// [`HeraldError::Transport`]; callers decide whether that is fatal.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the underlying connection is currently up.
    fn is_connected(&self) -> bool;

    /// Delivers one payload part to a recipient.
    async fn send(&self, recipient: &RecipientId, part: &OutboundPart) -> Result<(), HeraldError>;

    /// Asks the transport whether a recipient id is valid/reachable.
    async fn probe(&self, recipient: &RecipientId) -> Result<bool, HeraldError>;

    /// Waits for the next inbound event (message or connection-state change).
    async fn next_event(&self) -> Result<TransportEvent, HeraldError>;
}
