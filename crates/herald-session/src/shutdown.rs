// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! The engine loop and the sweep scheduler both run until a
//! [`CancellationToken`] trips. [`signal_token`] wires that token to SIGTERM
//! and SIGINT (Ctrl+C). Stores persist on every mutation, so nothing needs
//! flushing on the way out.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Returns a token that is cancelled when the process receives SIGTERM or
/// SIGINT. The watcher task idles in the background until a signal arrives.
pub fn signal_token() -> CancellationToken {
    let token = CancellationToken::new();
    let tripped = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        tripped.cancel();
        debug!("signal watcher finished");
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl+C, shutting down");
}
