// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Herald workspace.

use serde::{Deserialize, Serialize};

/// Opaque stable identifier for a conversational endpoint on the transport.
///
/// Used as the key for the recipient directory, greeting records, and
/// per-recipient sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(pub String);

impl RecipientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecipientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an inbound event, as assigned by the transport.
///
/// The transport may redeliver an event with the same id; the session engine
/// deduplicates on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Inbound side ---

/// A single inbound message event from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Transport-assigned event identifier, stable across redelivery.
    pub event_id: EventId,
    /// Who sent the message (for self-echoes, the peer the bot wrote to).
    pub sender: RecipientId,
    /// Message text; empty for media-only messages.
    pub text: String,
    /// True when this event is an echo of the bot's own outgoing message.
    pub is_self: bool,
    /// True for private one-to-one chats, false for group chats.
    pub is_direct: bool,
}

/// Events emitted by the transport's inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// An inbound message arrived.
    Message(InboundEvent),
    /// The underlying connection came up.
    Connected,
    /// The underlying connection dropped.
    Disconnected,
}

// --- Outbound side ---

/// One deliverable unit of a payload: text, an image, or a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPart {
    Text(String),
    Image {
        data: Vec<u8>,
        caption: Option<String>,
    },
    Document {
        data: Vec<u8>,
        caption: Option<String>,
        file_name: String,
    },
}

impl OutboundPart {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image { .. } => "image",
            Self::Document { .. } => "document",
        }
    }
}

/// The payload of one broadcast job. Any combination of the three parts may
/// be present; delivery order is text, then image, then document.
#[derive(Debug, Clone, Default)]
pub struct BroadcastPayload {
    pub text: Option<String>,
    pub image: Option<ImageAttachment>,
    pub document: Option<DocumentAttachment>,
}

/// An image blob with an optional caption.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub data: Vec<u8>,
    pub caption: Option<String>,
}

/// A document blob with an optional caption and a display filename.
#[derive(Debug, Clone)]
pub struct DocumentAttachment {
    pub data: Vec<u8>,
    pub caption: Option<String>,
    pub file_name: String,
}

impl BroadcastPayload {
    /// Materializes the present parts in delivery order.
    pub fn parts(&self) -> Vec<OutboundPart> {
        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(OutboundPart::Text(text.clone()));
        }
        if let Some(image) = &self.image {
            parts.push(OutboundPart::Image {
                data: image.data.clone(),
                caption: image.caption.clone(),
            });
        }
        if let Some(doc) = &self.document {
            parts.push(OutboundPart::Document {
                data: doc.data.clone(),
                caption: doc.caption.clone(),
                file_name: doc.file_name.clone(),
            });
        }
        parts
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none() && self.document.is_none()
    }
}

// --- Broadcast progress ---

/// Events streamed back to the caller of a broadcast run.
///
/// A run emits one `Delivered` per target in order, then exactly one `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// One target has been processed (successfully or not).
    Delivered {
        sent: usize,
        total: usize,
        target: RecipientId,
        success: bool,
    },
    /// The run finished. `error` is set when the run aborted early
    /// (e.g. the transport disconnected mid-run).
    Done {
        sent: usize,
        total: usize,
        error: Option<String>,
    },
}

// --- Contact resolution ---

/// Filter passed to a contact source when resolving broadcast targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactFilter {
    /// Every known contact, in source order.
    All,
    /// Contacts in a named category (matched case-insensitively).
    Category(String),
}

impl ContactFilter {
    /// Parses a CLI/category string; "all" (any case) maps to [`ContactFilter::All`].
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Category(s.trim().to_string())
        }
    }
}
