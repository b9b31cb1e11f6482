// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for Herald's external collaborators.
//!
//! The gateway core talks to the outside world through these traits only;
//! concrete adapters (the HTTP bridge, the CSV reader, the test mocks) live
//! in their own crates. All traits use `#[async_trait]` for dynamic dispatch.

pub mod contacts;
pub mod transport;

pub use contacts::ContactSource;
pub use transport::Transport;
