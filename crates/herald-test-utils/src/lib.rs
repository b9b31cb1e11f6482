// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Herald integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a live bridge process.
//!
//! # Components
//!
//! - [`MockTransport`] - Mock messaging transport with event injection and send capture
//! - [`MockContacts`] - In-memory contact source with category filtering
//! - [`TestHarness`] - Full gateway stack wired to mocks and temp stores

pub mod harness;
pub mod mock_contacts;
pub mod mock_transport;

pub use harness::TestHarness;
pub use mock_contacts::MockContacts;
pub use mock_transport::MockTransport;
