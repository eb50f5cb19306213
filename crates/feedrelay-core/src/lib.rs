// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the feedrelay service.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the feedrelay workspace. All collaborator
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FeedrelayError;
pub use types::{
    AdapterType, EventDelivery, FeedbackAction, FeedbackRecord, HealthStatus, NotificationEvent,
};

// Re-export all adapter traits at crate root.
pub use traits::{EventChannel, MailSender, RecordStore, ServiceAdapter};
