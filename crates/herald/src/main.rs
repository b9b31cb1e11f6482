// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - a messaging gateway with an automated menu responder.
//!
//! This is the binary entry point for the Herald gateway.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod broadcast;
mod contacts;
mod serve;
mod sweep;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Herald - a messaging gateway with an automated menu responder.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the gateway (responder, admin commands, scheduled sweeps).
    Serve,
    /// Send a payload to every contact in a category, with live progress.
    Broadcast(BroadcastArgs),
    /// Run one liveness sweep over the directory and print the report.
    Sweep,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

/// Payload and targeting flags for `herald broadcast`.
#[derive(Args, Debug)]
struct BroadcastArgs {
    /// Contact category to target, or "all".
    #[arg(long, default_value = "all")]
    category: String,

    /// Text part of the payload.
    #[arg(long)]
    text: Option<String>,

    /// Path to an image file to attach.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Caption for the image.
    #[arg(long)]
    caption: Option<String>,

    /// Path to a document file to attach.
    #[arg(long)]
    document: Option<PathBuf>,

    /// Caption for the document.
    #[arg(long)]
    doc_caption: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match herald_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            herald_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Broadcast(args) => broadcast::run_broadcast(config, args).await,
        Commands::Sweep => sweep::run_sweep(config).await,
        Commands::CheckConfig => {
            println!("configuration OK (gateway.name={})", config.gateway.name);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc can advance the profiling epoch; the system
        // allocator has no such knob.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = herald_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.gateway.name, "herald");
    }

    #[test]
    fn broadcast_flags_parse() {
        let cli = Cli::try_parse_from([
            "herald",
            "broadcast",
            "--category",
            "wholesale",
            "--text",
            "spring offers",
        ])
        .unwrap();

        match cli.command {
            Commands::Broadcast(args) => {
                assert_eq!(args.category, "wholesale");
                assert_eq!(args.text.as_deref(), Some("spring offers"));
                assert!(args.image.is_none());
            }
            other => panic!("expected the broadcast command, got {other:?}"),
        }
    }

    #[test]
    fn category_defaults_to_all() {
        let cli = Cli::try_parse_from(["herald", "broadcast", "--text", "hi"]).unwrap();
        match cli.command {
            Commands::Broadcast(args) => assert_eq!(args.category, "all"),
            other => panic!("expected the broadcast command, got {other:?}"),
        }
    }
}
