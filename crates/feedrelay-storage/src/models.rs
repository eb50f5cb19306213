// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical feedback and upload types are defined in
//! `feedrelay-core::types` for use across adapter trait boundaries; this
//! module re-exports them and adds the queue entry type, which never leaves
//! the storage layer.

pub use feedrelay_core::types::{FeedbackRecord, NewFeedback, NewUpload, UploadRecord};

/// One row of the crash-safe notification queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}
