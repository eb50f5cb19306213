// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits for the external collaborators.
//!
//! The core never talks to a concrete database, queue, or mail API; it goes
//! through these narrow interfaces so tests can substitute deterministic
//! in-memory fakes.

pub mod adapter;
pub mod channel;
pub mod mailer;
pub mod store;

pub use adapter::ServiceAdapter;
pub use channel::EventChannel;
pub use mailer::MailSender;
pub use store::RecordStore;
