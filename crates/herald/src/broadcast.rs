// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald broadcast` command implementation.
//!
//! One-shot bulk send: resolves targets from the contact source, waits for
//! the bridge session, runs a broadcast job, and renders the progress
//! stream as a terminal progress bar.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use herald_bridge::BridgeTransport;
use herald_broadcast::{BroadcastController, BroadcastSettings};
use herald_config::model::HeraldConfig;
use herald_core::error::HeraldError;
use herald_core::types::{
    BroadcastPayload, ContactFilter, DocumentAttachment, ImageAttachment, ProgressEvent,
};
use herald_core::{ContactSource, Transport};
use indicatif::ProgressBar;

use crate::contacts::CsvContactSource;
use crate::BroadcastArgs;

/// How long to wait for the bridge session before giving up.
const CONNECT_WAIT: Duration = Duration::from_secs(10);

/// Runs the `herald broadcast` command.
pub async fn run_broadcast(config: HeraldConfig, args: BroadcastArgs) -> Result<(), HeraldError> {
    let payload = build_payload(&args).await?;
    if payload.is_empty() {
        return Err(HeraldError::Config(
            "broadcast needs at least one of --text, --image, or --document".into(),
        ));
    }

    let contacts = CsvContactSource::new(config.contacts.clone());
    let filter = ContactFilter::parse(&args.category);
    let targets = contacts.resolve(&filter).await?;
    println!(
        "resolved {} recipients for category \"{}\"",
        targets.len(),
        args.category
    );

    let transport: Arc<dyn Transport> = Arc::new(BridgeTransport::new(&config.bridge)?);
    wait_until_connected(transport.as_ref(), CONNECT_WAIT).await?;

    let settings = BroadcastSettings {
        pace: Duration::from_millis(config.broadcast.pace_ms),
        pause_poll: Duration::from_millis(config.broadcast.pause_poll_ms),
    };
    let controller = BroadcastController::new(transport, settings);
    let mut progress = controller.start(targets, payload).await?;

    let bar = ProgressBar::new(0);
    let mut processed = 0u64;
    while let Some(event) = progress.recv().await {
        match event {
            ProgressEvent::Delivered {
                total,
                target,
                success,
                ..
            } => {
                bar.set_length(total as u64);
                processed += 1;
                bar.set_position(processed);
                if !success {
                    bar.println(format!("delivery failed: {target}"));
                }
            }
            ProgressEvent::Done { sent, total, error } => {
                bar.finish_and_clear();
                if let Some(error) = error {
                    eprintln!("broadcast aborted after {sent}/{total} deliveries");
                    return Err(HeraldError::Transport {
                        message: error,
                        source: None,
                    });
                }
                println!("broadcast complete: {sent}/{total} delivered");
            }
        }
    }

    Ok(())
}

/// Assembles the payload from CLI flags, reading attachment files.
async fn build_payload(args: &BroadcastArgs) -> Result<BroadcastPayload, HeraldError> {
    let mut payload = BroadcastPayload {
        text: args.text.clone(),
        ..BroadcastPayload::default()
    };

    if let Some(path) = &args.image {
        payload.image = Some(ImageAttachment {
            data: read_attachment(path).await?,
            caption: args.caption.clone(),
        });
    }

    if let Some(path) = &args.document {
        payload.document = Some(DocumentAttachment {
            data: read_attachment(path).await?,
            caption: args.doc_caption.clone(),
            file_name: file_name_of(path),
        });
    }

    Ok(payload)
}

async fn read_attachment(path: &Path) -> Result<Vec<u8>, HeraldError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| HeraldError::Config(format!("cannot read attachment {}: {e}", path.display())))
}

/// Last path segment, or the whole path when it has none.
fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Drains transport events until the daemon reports the session is up.
async fn wait_until_connected(
    transport: &dyn Transport,
    wait: Duration,
) -> Result<(), HeraldError> {
    let ready = tokio::time::timeout(wait, async {
        while !transport.is_connected() {
            transport.next_event().await?;
        }
        Ok::<_, HeraldError>(())
    })
    .await;

    match ready {
        Ok(result) => result,
        Err(_) => Err(HeraldError::NotConnected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn args_with(text: Option<&str>) -> BroadcastArgs {
        BroadcastArgs {
            category: "all".into(),
            text: text.map(String::from),
            image: None,
            caption: None,
            document: None,
            doc_caption: None,
        }
    }

    #[tokio::test]
    async fn text_only_payload_carries_no_attachments() {
        let payload = build_payload(&args_with(Some("hello"))).await.unwrap();
        assert_eq!(payload.text.as_deref(), Some("hello"));
        assert!(payload.image.is_none());
        assert!(payload.document.is_none());
    }

    #[tokio::test]
    async fn attachment_files_are_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("offer.png");
        let doc_path = dir.path().join("catalog.pdf");
        std::fs::write(&image_path, [1u8, 2, 3]).unwrap();
        std::fs::write(&doc_path, [4u8, 5]).unwrap();

        let mut args = args_with(None);
        args.image = Some(image_path);
        args.caption = Some("spring".into());
        args.document = Some(doc_path);

        let payload = build_payload(&args).await.unwrap();
        let image = payload.image.unwrap();
        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.caption.as_deref(), Some("spring"));

        let document = payload.document.unwrap();
        assert_eq!(document.data, vec![4, 5]);
        assert_eq!(document.file_name, "catalog.pdf");
        assert!(document.caption.is_none());
    }

    #[tokio::test]
    async fn missing_attachment_is_a_config_error() {
        let mut args = args_with(None);
        args.image = Some(PathBuf::from("/nonexistent/offer.png"));

        let err = build_payload(&args).await.unwrap_err();
        assert!(matches!(err, HeraldError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn connect_wait_times_out_without_a_session() {
        let transport = herald_test_utils::MockTransport::new();
        transport.set_connected(false);

        let err = wait_until_connected(&transport, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, HeraldError::NotConnected));
    }
}
