// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for feedrelay integration tests.
//!
//! Deterministic in-memory implementations of the three capability traits,
//! so the submission state machine, delivery handler, and caretaker sweep
//! can be tested without SQLite, a queue, or a mail API.

pub mod memory_store;
pub mod mock_channel;
pub mod mock_mailer;

pub use memory_store::MemoryStore;
pub use mock_channel::MockChannel;
pub use mock_mailer::MockMailer;
