// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat-file persistence layer for the Herald messaging gateway.
//!
//! Two tiny documents back the gateway's durable state: the recipient
//! directory (a JSON array of ids) and the greeting record (a JSON map of
//! id to last-greeted timestamp). Each store guards its in-memory structure
//! with its own `tokio::sync::Mutex` and rewrites its file in full on every
//! mutation, so a mutation is durable before the guard is released.

mod file;

pub mod directory;
pub mod greeting;

pub use directory::DirectoryStore;
pub use greeting::GreetingStore;
