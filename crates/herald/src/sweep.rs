// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald sweep` command implementation.
//!
//! Runs one liveness sweep over the directory and prints the report.
//! Probes go straight to the bridge daemon, so the command works without
//! subscribing to the event feed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use herald_bridge::BridgeTransport;
use herald_config::model::HeraldConfig;
use herald_core::error::HeraldError;
use herald_core::Transport;
use herald_resilience::{DeliveryPolicy, ReliableSender};
use herald_store::DirectoryStore;

/// Runs the `herald sweep` command.
pub async fn run_sweep(config: HeraldConfig) -> Result<(), HeraldError> {
    let data_dir = PathBuf::from(&config.storage.data_dir);
    let directory = Arc::new(DirectoryStore::open(&data_dir).await?);

    let transport: Arc<dyn Transport> = Arc::new(BridgeTransport::new(&config.bridge)?);
    let policy = DeliveryPolicy::new(
        config.delivery.retry_attempts,
        Duration::from_millis(config.delivery.retry_backoff_ms),
    );
    let sender = ReliableSender::new(transport, directory, policy);

    let report = sender.health_sweep().await;
    println!(
        "sweep complete: {} recipients checked, {} pruned",
        report.checked, report.pruned
    );
    Ok(())
}
