// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald serve` command implementation.
//!
//! Wires the bridge transport, persistent stores, reliable sender, session
//! engine, and sweep scheduler together, then runs the engine until a
//! shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use herald_bridge::BridgeTransport;
use herald_config::model::HeraldConfig;
use herald_core::error::HeraldError;
use herald_core::Transport;
use herald_cron::SweepScheduler;
use herald_resilience::{DeliveryPolicy, ReliableSender};
use herald_session::shutdown;
use herald_session::SessionEngine;
use herald_store::{DirectoryStore, GreetingStore};
use tracing::info;

/// Runs the `herald serve` command.
pub async fn run_serve(config: HeraldConfig) -> Result<(), HeraldError> {
    init_tracing(&config.gateway.log_level);

    info!(gateway = config.gateway.name.as_str(), "starting herald serve");

    // Open the persistent stores.
    let data_dir = PathBuf::from(&config.storage.data_dir);
    let directory = Arc::new(DirectoryStore::open(&data_dir).await?);
    let greetings = Arc::new(GreetingStore::open(&data_dir).await?);
    info!(
        path = %data_dir.display(),
        recipients = directory.len().await,
        "stores opened"
    );

    // Connect the transport and the reliable delivery layer.
    let transport: Arc<dyn Transport> = Arc::new(BridgeTransport::new(&config.bridge)?);
    let policy = DeliveryPolicy::new(
        config.delivery.retry_attempts,
        Duration::from_millis(config.delivery.retry_backoff_ms),
    );
    let sender = Arc::new(ReliableSender::new(
        transport.clone(),
        directory.clone(),
        policy,
    ));

    let mut engine = SessionEngine::new(
        &config,
        transport.clone(),
        directory.clone(),
        greetings.clone(),
        sender.clone(),
    );

    let cancel = shutdown::signal_token();

    // Spawn the sweep scheduler background task if enabled.
    if config.sweep.enabled {
        let scheduler = SweepScheduler::new(&config.sweep, sender.clone())?;
        let sweep_cancel = cancel.clone();
        tokio::spawn(async move {
            scheduler.run(sweep_cancel).await;
        });
        info!(
            schedule = config.sweep.schedule.as_str(),
            "sweep scheduler started"
        );
    } else {
        info!("scheduled sweeps disabled by configuration");
    }

    engine.run(cancel).await?;

    info!("herald serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("herald={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
