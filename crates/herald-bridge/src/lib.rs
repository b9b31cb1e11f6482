// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP bridge transport for the Herald gateway.
//!
//! Implements [`Transport`] against the local bridge daemon that owns the
//! real messaging session. Outbound parts go out as JSON via `POST /send`,
//! liveness probes hit `GET /probe/{id}`, and inbound events arrive through
//! a buffered long poll of `GET /events`.
//!
//! Connection state is tracked from both directions: `connected` /
//! `disconnected` events from the daemon flip it, and a failed event poll
//! counts as a disconnect (one synthetic `Disconnected` is pushed into the
//! event stream so consumers see the drop).

pub mod wire;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use herald_config::model::BridgeConfig;
use herald_core::error::HeraldError;
use herald_core::traits::Transport;
use herald_core::types::{OutboundPart, RecipientId, TransportEvent};
use reqwest::header::{HeaderMap, HeaderValue};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::wire::{EventEnvelope, ProbeResponse, SendRequest};

/// Wait before re-polling the event feed after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

/// [`Transport`] implementation speaking HTTP to the bridge daemon.
#[derive(Debug)]
pub struct BridgeTransport {
    client: reqwest::Client,
    base_url: String,
    poll_timeout_secs: u64,
    connected: AtomicBool,
    buffer: Mutex<VecDeque<TransportEvent>>,
}

impl BridgeTransport {
    /// Builds a transport from the bridge configuration.
    ///
    /// Starts disconnected; the daemon announces the session state through
    /// the event feed.
    pub fn new(config: &BridgeConfig) -> Result<Self, HeraldError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(token) = config.api_token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                HeraldError::Config(format!("bridge.api_token is not a valid header value: {e}"))
            })?;
            headers.insert("authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| HeraldError::transport("failed to build bridge HTTP client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_timeout_secs: config.poll_timeout_secs,
            connected: AtomicBool::new(false),
            buffer: Mutex::new(VecDeque::new()),
        })
    }

    /// One long-poll round against `GET /events`.
    async fn poll_events(&self) -> Result<Vec<EventEnvelope>, HeraldError> {
        let url = format!("{}/events", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("timeout", self.poll_timeout_secs)])
            .send()
            .await
            .map_err(|e| HeraldError::transport("event poll failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HeraldError::Transport {
                message: format!("event poll returned {status}: {body}"),
                source: None,
            });
        }

        response
            .json()
            .await
            .map_err(|e| HeraldError::transport("malformed event feed payload", e))
    }

    /// Updates the connection flag from an event, at enqueue time, so
    /// `is_connected` reflects the newest knowledge even before the
    /// consumer drains the buffer.
    fn note_connection_state(&self, event: &TransportEvent) {
        match event {
            TransportEvent::Connected => self.connected.store(true, Ordering::SeqCst),
            TransportEvent::Disconnected => self.connected.store(false, Ordering::SeqCst),
            TransportEvent::Message(_) => {}
        }
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send(&self, recipient: &RecipientId, part: &OutboundPart) -> Result<(), HeraldError> {
        let url = format!("{}/send", self.base_url);
        let body = SendRequest::new(recipient, part);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HeraldError::transport(format!("send to {recipient} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(HeraldError::Transport {
                message: format!("bridge rejected send to {recipient}: {status}: {detail}"),
                source: None,
            });
        }

        debug!(recipient = %recipient, kind = part.kind(), "part delivered");
        Ok(())
    }

    async fn probe(&self, recipient: &RecipientId) -> Result<bool, HeraldError> {
        let url = format!("{}/probe/{}", self.base_url, recipient);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HeraldError::transport(format!("probe for {recipient} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(HeraldError::Transport {
                message: format!("probe for {recipient} returned {status}: {detail}"),
                source: None,
            });
        }

        let probe: ProbeResponse = response
            .json()
            .await
            .map_err(|e| HeraldError::transport("malformed probe response", e))?;
        Ok(probe.registered)
    }

    async fn next_event(&self) -> Result<TransportEvent, HeraldError> {
        loop {
            if let Some(event) = self.buffer.lock().await.pop_front() {
                return Ok(event);
            }

            match self.poll_events().await {
                Ok(envelopes) => {
                    let mut buffer = self.buffer.lock().await;
                    for envelope in envelopes {
                        let event = envelope.into_event();
                        self.note_connection_state(&event);
                        buffer.push_back(event);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "event poll failed");
                    if self.connected.swap(false, Ordering::SeqCst) {
                        self.buffer
                            .lock()
                            .await
                            .push_back(TransportEvent::Disconnected);
                    } else {
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                    }
                }
            }
        }
    }
}
