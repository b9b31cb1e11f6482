// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Herald messaging gateway.

use thiserror::Error;

/// The primary error type used across all Herald crates and core operations.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Store errors (directory/greeting file I/O, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport errors (connection failure, send rejected, probe failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The transport reports no active connection.
    #[error("transport is not connected")]
    NotConnected,

    /// A broadcast job is already in flight.
    #[error("a broadcast is already running")]
    AlreadyRunning,

    /// The resolved target list contains no recipients.
    #[error("no recipients to broadcast to")]
    EmptyTargetSet,

    /// An admin broadcast command carried no message body.
    #[error("broadcast command has an empty body")]
    EmptyCommandBody,

    /// Contact source errors (unreadable file, malformed rows).
    #[error("contact source error: {message}")]
    ContactSource {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HeraldError {
    /// Wraps an arbitrary error as a transport failure with context.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps an arbitrary error as a store failure.
    pub fn store(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store {
            source: Box::new(source),
        }
    }
}
