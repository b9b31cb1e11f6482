// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald messaging gateway.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Herald workspace. Concrete transport and
//! contact-source adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HeraldError;
pub use types::{
    BroadcastPayload, ContactFilter, DocumentAttachment, EventId, ImageAttachment, InboundEvent,
    OutboundPart, ProgressEvent, RecipientId, TransportEvent,
};

// Re-export the capability traits at crate root.
pub use traits::{ContactSource, Transport};
