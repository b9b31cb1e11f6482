// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete gateway stack with a mock transport,
//! temp-directory stores, and all required subsystems. Provides
//! `deliver_text()` to drive the full inbound pipeline in tests.

use std::sync::Arc;

use herald_config::model::{HeraldConfig, ResponderConfig};
use herald_core::error::HeraldError;
use herald_core::types::{EventId, InboundEvent, RecipientId};
use herald_resilience::{DeliveryPolicy, ReliableSender};
use herald_session::SessionEngine;
use herald_store::{DirectoryStore, GreetingStore};

use crate::mock_transport::MockTransport;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responder: ResponderConfig,
    policy: DeliveryPolicy,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responder: ResponderConfig::default(),
            policy: DeliveryPolicy::default(),
        }
    }

    /// Replace the responder configuration (keywords, admins, bundles, ...).
    pub fn with_responder(mut self, responder: ResponderConfig) -> Self {
        self.responder = responder;
        self
    }

    /// Mark recipient ids as administrators.
    pub fn with_admins(mut self, admins: Vec<String>) -> Self {
        self.responder.admins = admins;
        self
    }

    /// Replace the retry policy used by the reliable sender.
    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, HeraldError> {
        let temp_dir = tempfile::TempDir::new().map_err(HeraldError::store)?;

        let transport = Arc::new(MockTransport::new());
        let directory = Arc::new(DirectoryStore::open(temp_dir.path()).await?);
        let greetings = Arc::new(GreetingStore::open(temp_dir.path()).await?);
        let sender = Arc::new(ReliableSender::new(
            transport.clone(),
            directory.clone(),
            self.policy,
        ));

        let config = HeraldConfig {
            responder: self.responder,
            ..HeraldConfig::default()
        };
        let engine = SessionEngine::new(
            &config,
            transport.clone(),
            directory.clone(),
            greetings.clone(),
            sender.clone(),
        );

        Ok(TestHarness {
            transport,
            directory,
            greetings,
            sender,
            engine,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock transport and temp stores.
///
/// Exposes every subsystem for assertions and a `deliver_text()` method that
/// drives the full inbound pipeline (dedup -> directory -> greeting -> menu).
pub struct TestHarness {
    /// The mock messaging transport.
    pub transport: Arc<MockTransport>,
    /// Recipient directory backed by a temp file.
    pub directory: Arc<DirectoryStore>,
    /// Greeting record backed by a temp file.
    pub greetings: Arc<GreetingStore>,
    /// Retrying sender wired to the mock transport and directory.
    pub sender: Arc<ReliableSender>,
    /// The session engine under test.
    pub engine: SessionEngine,
    /// Gateway configuration the engine was built from.
    pub config: HeraldConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with all-default configuration.
    pub async fn new() -> Result<Self, HeraldError> {
        Self::builder().build().await
    }

    /// Feed one private text message through the inbound pipeline.
    pub async fn deliver_text(&mut self, sender: &str, text: &str) -> Result<(), HeraldError> {
        self.engine.handle_inbound(private_message(sender, text)).await
    }

    /// Feed an arbitrary inbound event through the pipeline.
    pub async fn deliver(&mut self, event: InboundEvent) -> Result<(), HeraldError> {
        self.engine.handle_inbound(event).await
    }
}

/// A private (direct-chat) inbound message with a fresh event id.
pub fn private_message(sender: &str, text: &str) -> InboundEvent {
    InboundEvent {
        event_id: EventId(format!("evt-{}", uuid::Uuid::new_v4())),
        sender: RecipientId::new(sender),
        text: text.to_string(),
        is_self: false,
        is_direct: true,
    }
}

/// A self-echo of the gateway's own outgoing message.
pub fn self_message(sender: &str, text: &str) -> InboundEvent {
    InboundEvent {
        is_self: true,
        ..private_message(sender, text)
    }
}
