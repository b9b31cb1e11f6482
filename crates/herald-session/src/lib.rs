// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational session engine for the Herald gateway.
//!
//! The [`SessionEngine`] is the central coordinator that:
//! - Receives events from the messaging transport
//! - Deduplicates redelivered events and tracks new recipients
//! - Greets first-time (or long-quiet) senders
//! - Drives the numbered menu flow per recipient
//! - Executes the in-chat admin broadcast command
//! - Handles graceful shutdown

pub mod dedup;
pub mod menu;
pub mod session;
pub mod shutdown;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use herald_config::model::{BundleConfig, HeraldConfig, ResponderConfig};
use herald_core::error::HeraldError;
use herald_core::types::{InboundEvent, OutboundPart, RecipientId, TransportEvent};
use herald_core::Transport;
use herald_resilience::{Pacer, ReliableSender};
use herald_store::{DirectoryStore, GreetingStore};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dedup::DedupWindow;
use crate::menu::MenuAction;
use crate::session::{MenuSession, SessionState};

/// Reply sent when a bundle request arrives while one is already going out.
const STILL_SENDING_REPLY: &str = "One moment, the previous files are still on their way.";

/// The conversational engine that coordinates inbound events, menus,
/// greetings, and the admin broadcast command.
///
/// Owns the session map and the processed-event set outright; the directory
/// and greeting stores are shared with the resilience subsystem and the
/// scheduler.
pub struct SessionEngine {
    config: ResponderConfig,
    transport: Arc<dyn Transport>,
    directory: Arc<DirectoryStore>,
    greetings: Arc<GreetingStore>,
    sender: Arc<ReliableSender>,
    sessions: HashMap<RecipientId, MenuSession>,
    dedup: DedupWindow,
    pace: Duration,
}

impl SessionEngine {
    pub fn new(
        config: &HeraldConfig,
        transport: Arc<dyn Transport>,
        directory: Arc<DirectoryStore>,
        greetings: Arc<GreetingStore>,
        sender: Arc<ReliableSender>,
    ) -> Self {
        let responder = config.responder.clone();
        info!(
            gateway = config.gateway.name.as_str(),
            keywords = responder.menu_keywords.len(),
            bundles = responder.bundles.len(),
            "session engine initialized"
        );
        Self {
            pace: Duration::from_millis(responder.pace_ms),
            dedup: DedupWindow::new(Duration::from_secs(responder.dedup_window_secs)),
            transport,
            directory,
            greetings,
            sender,
            sessions: HashMap::new(),
            config: responder,
        }
    }

    /// Drives the engine until the transport closes or `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), HeraldError> {
        info!("session engine started");

        loop {
            tokio::select! {
                event = self.transport.next_event() => match event {
                    Ok(TransportEvent::Message(inbound)) => {
                        if let Err(e) = self.handle_inbound(inbound).await {
                            error!(error = %e, "failed to handle inbound event");
                        }
                    }
                    Ok(TransportEvent::Connected) => {
                        info!("transport connected");
                    }
                    Ok(TransportEvent::Disconnected) => {
                        warn!("transport disconnected");
                    }
                    Err(e) => {
                        error!(error = %e, "transport event stream failed");
                        break;
                    }
                },
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping session engine");
                    break;
                }
            }
        }

        info!("session engine stopped");
        Ok(())
    }

    /// Runs one inbound event through the pipeline: dedup, directory update,
    /// self-echo filter, greeting, admin command, menu entry, menu dispatch.
    pub async fn handle_inbound(&mut self, event: InboundEvent) -> Result<(), HeraldError> {
        // 1. Drop redelivered events.
        if !self.dedup.insert(event.event_id.clone()) {
            debug!(event_id = event.event_id.0.as_str(), "duplicate event discarded");
            return Ok(());
        }

        let sender_id = event.sender.clone();
        let is_admin = self.is_admin(&sender_id);
        let trimmed = event.text.trim();
        let normalized = trimmed.to_lowercase();

        // 2. First contact from a private sender lands in the directory.
        if event.is_direct
            && !event.is_self
            && !is_admin
            && !self.directory.contains(&sender_id).await
        {
            self.directory.insert(sender_id.clone()).await?;
            info!(sender = %sender_id, "new recipient recorded");
        }

        // 3. Our own echoes only matter when they carry the broadcast command.
        if event.is_self && !trimmed.starts_with(&self.config.command_prefix) {
            return Ok(());
        }

        // 4. Greeting, unless the sender is about to see the menu anyway.
        if event.is_direct && !event.is_self {
            if self.is_menu_keyword(&normalized) {
                self.record_greeting(&sender_id).await?;
            } else if self.greeting_due(&sender_id).await
                && self.reply(&sender_id, &self.config.greeting).await
            {
                self.record_greeting(&sender_id).await?;
            }
        }

        // 5. Admin broadcast command.
        if is_admin && trimmed.starts_with(&self.config.command_prefix) {
            return self.handle_broadcast_command(&sender_id, trimmed).await;
        }
        if event.is_self {
            // Echo of a command from a non-admin sender; nothing else applies.
            return Ok(());
        }

        // 6. A menu-starter keyword (re)opens the menu.
        if event.is_direct && self.is_menu_keyword(&normalized) {
            let session = self.sessions.entry(sender_id.clone()).or_default();
            session.activate();
            let listing = menu::render_main_menu(&self.config);
            self.reply(&sender_id, &listing).await;
            return Ok(());
        }

        // 7. Numbered choice against the active menu.
        if !event.is_direct {
            return Ok(());
        }
        let state = match self.sessions.get(&sender_id) {
            Some(session) if session.menu_active => session.state,
            _ => return Ok(()),
        };
        match menu::dispatch(state, &normalized, &self.config) {
            MenuAction::ShowProducts => {
                self.transition(&sender_id, SessionState::Products);
                let listing = menu::render_products_menu(&self.config);
                self.reply(&sender_id, &listing).await;
            }
            MenuAction::Reply(text) => {
                self.deactivate(&sender_id);
                self.reply(&sender_id, &text).await;
            }
            MenuAction::BackToMain => {
                self.transition(&sender_id, SessionState::MainMenu);
                let listing = menu::render_main_menu(&self.config);
                self.reply(&sender_id, &listing).await;
            }
            MenuAction::SendBundle(index) => {
                // 8. Busy-guarded bundle send.
                if self.sessions.get(&sender_id).is_some_and(|s| s.busy) {
                    self.reply(&sender_id, STILL_SENDING_REPLY).await;
                    return Ok(());
                }
                let Some(bundle) = self.config.bundles.get(index).cloned() else {
                    return Ok(());
                };
                self.deactivate(&sender_id);
                self.set_busy(&sender_id, true);
                self.send_bundle(&sender_id, &bundle).await;
                self.set_busy(&sender_id, false);
            }
            MenuAction::Deactivate => {
                debug!(sender = %sender_id, state = %state, "invalid menu choice, closing menu");
                self.deactivate(&sender_id);
            }
        }

        Ok(())
    }

    /// Delivers the command body to every directory entry except the sender,
    /// probing liveness first and pruning dead entries along the way.
    async fn handle_broadcast_command(
        &self,
        sender_id: &RecipientId,
        text: &str,
    ) -> Result<(), HeraldError> {
        let body = match extract_command_body(text, &self.config.command_prefix) {
            Ok(body) => body,
            Err(HeraldError::EmptyCommandBody) => {
                let usage = format!("Usage: {} <message>", self.config.command_prefix);
                self.reply(sender_id, &usage).await;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let targets: Vec<RecipientId> = self
            .directory
            .snapshot()
            .await
            .into_iter()
            .filter(|target| target != sender_id)
            .collect();

        info!(count = targets.len(), "admin broadcast starting");
        let announce = format!("Broadcasting to {} recipients.", targets.len());
        self.reply(sender_id, &announce).await;

        let mut delivered = 0usize;
        let mut failed = 0usize;
        let mut pacer = Pacer::new(self.pace);
        for (index, target) in targets.iter().enumerate() {
            if self.sender.is_alive(target).await {
                if self.sender.send_with_retry(target, &body).await {
                    delivered += 1;
                } else {
                    failed += 1;
                }
            } else {
                if let Err(e) = self.sender.prune_recipient(target).await {
                    warn!(target = %target, error = %e, "failed to prune dead recipient");
                }
                failed += 1;
            }
            if index + 1 < targets.len() {
                pacer.pace().await;
            }
        }

        info!(delivered, failed, "admin broadcast finished");
        let notice = format!("Broadcast complete: {delivered} delivered, {failed} failed.");
        self.reply(sender_id, &notice).await;
        Ok(())
    }

    /// Sends a bundle's announcement and documents to one recipient, pacing
    /// between items. Unreadable files and rejected sends are logged and
    /// skipped.
    async fn send_bundle(&self, recipient: &RecipientId, bundle: &BundleConfig) {
        info!(
            target = %recipient,
            bundle = bundle.name.as_str(),
            files = bundle.files.len(),
            "sending bundle"
        );

        if !bundle.announcement.is_empty() {
            self.reply(recipient, &bundle.announcement).await;
        }

        let mut pacer = Pacer::new(self.pace);
        for (index, path) in bundle.files.iter().enumerate() {
            match tokio::fs::read(path).await {
                Ok(data) => {
                    let part = OutboundPart::Document {
                        data,
                        caption: None,
                        file_name: file_name_of(path),
                    };
                    if let Err(e) = self.transport.send(recipient, &part).await {
                        warn!(
                            target = %recipient,
                            file = path.as_str(),
                            error = %e,
                            "bundle document send failed"
                        );
                    }
                }
                Err(e) => {
                    warn!(file = path.as_str(), error = %e, "bundle document unreadable");
                }
            }
            if index + 1 < bundle.files.len() {
                pacer.pace().await;
            }
        }
    }

    /// Best-effort text send. Returns whether the transport accepted it.
    async fn reply(&self, to: &RecipientId, text: &str) -> bool {
        let part = OutboundPart::Text(text.to_string());
        match self.transport.send(to, &part).await {
            Ok(()) => true,
            Err(e) => {
                warn!(target = %to, error = %e, "reply send failed");
                false
            }
        }
    }

    async fn greeting_due(&self, id: &RecipientId) -> bool {
        match self.greetings.last_greeted(id).await {
            None => true,
            Some(last) => {
                let cooldown = chrono::Duration::hours(self.config.greeting_cooldown_hours as i64);
                Utc::now().signed_duration_since(last) >= cooldown
            }
        }
    }

    async fn record_greeting(&self, id: &RecipientId) -> Result<(), HeraldError> {
        self.greetings.record(id.clone(), Utc::now()).await
    }

    fn is_admin(&self, id: &RecipientId) -> bool {
        self.config.admins.iter().any(|admin| admin == id.as_str())
    }

    fn is_menu_keyword(&self, normalized: &str) -> bool {
        self.config
            .menu_keywords
            .iter()
            .any(|keyword| keyword.to_lowercase() == normalized)
    }

    fn transition(&mut self, id: &RecipientId, state: SessionState) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.state = state;
        }
    }

    fn deactivate(&mut self, id: &RecipientId) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.deactivate();
        }
    }

    fn set_busy(&mut self, id: &RecipientId, busy: bool) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.busy = busy;
        }
    }
}

/// Splits the broadcast command body off its prefix.
fn extract_command_body(text: &str, prefix: &str) -> Result<String, HeraldError> {
    let body = text
        .trim()
        .strip_prefix(prefix)
        .unwrap_or_default()
        .trim();
    if body.is_empty() {
        return Err(HeraldError::EmptyCommandBody);
    }
    Ok(body.to_string())
}

fn file_name_of(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
