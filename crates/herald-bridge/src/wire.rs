// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON wire format spoken to the bridge daemon.
//!
//! Outbound: `POST /send` carries a [`SendRequest`] with binary blobs
//! base64-encoded. Inbound: `GET /events` returns an array of
//! [`EventEnvelope`]s; a fresh subscriber receives the daemon's current
//! connection state as its first event, so a restarted gateway learns
//! whether the session is up without waiting for a state change.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use herald_core::types::{EventId, InboundEvent, OutboundPart, RecipientId, TransportEvent};
use serde::{Deserialize, Serialize};

/// Body of `POST /send`.
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub to: &'a str,
    #[serde(flatten)]
    pub part: WirePart<'a>,
}

impl<'a> SendRequest<'a> {
    pub fn new(recipient: &'a RecipientId, part: &'a OutboundPart) -> Self {
        Self {
            to: recipient.as_str(),
            part: WirePart::from(part),
        }
    }
}

/// One outbound payload part, tagged by kind.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    Image {
        data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<&'a str>,
    },
    Document {
        data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<&'a str>,
        file_name: &'a str,
    },
}

impl<'a> From<&'a OutboundPart> for WirePart<'a> {
    fn from(part: &'a OutboundPart) -> Self {
        match part {
            OutboundPart::Text(text) => Self::Text { text },
            OutboundPart::Image { data, caption } => Self::Image {
                data: STANDARD.encode(data),
                caption: caption.as_deref(),
            },
            OutboundPart::Document {
                data,
                caption,
                file_name,
            } => Self::Document {
                data: STANDARD.encode(data),
                caption: caption.as_deref(),
                file_name,
            },
        }
    }
}

/// Body of the `GET /probe/{id}` response.
#[derive(Debug, Deserialize)]
pub struct ProbeResponse {
    pub registered: bool,
}

/// One entry of the `GET /events` long-poll response array.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    Message(WireMessage),
    Connected,
    Disconnected,
}

/// Inbound message fields as the daemon reports them.
///
/// `text` may be absent for media-only messages; everything else is
/// required.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub event_id: String,
    pub sender: String,
    #[serde(default)]
    pub text: String,
    pub is_self: bool,
    pub is_direct: bool,
}

impl EventEnvelope {
    pub fn into_event(self) -> TransportEvent {
        match self {
            Self::Message(message) => TransportEvent::Message(InboundEvent {
                event_id: EventId(message.event_id),
                sender: RecipientId::new(message.sender),
                text: message.text,
                is_self: message.is_self,
                is_direct: message.is_direct,
            }),
            Self::Connected => TransportEvent::Connected,
            Self::Disconnected => TransportEvent::Disconnected,
        }
    }
}
