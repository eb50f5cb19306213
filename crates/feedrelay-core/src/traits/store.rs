// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait: typed access to feedback records and their uploads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FeedrelayError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{FeedbackRecord, NewFeedback, NewUpload, UploadRecord};

/// Durable storage for feedback records and their upload children.
///
/// The store offers create-with-generated-id, get-by-id, conditional field
/// queries over the flat collection, child append per parent id, and
/// targeted updates. No multi-record transactions are assumed; callers rely
/// on idempotent transitions rather than isolation.
#[async_trait]
pub trait RecordStore: ServiceAdapter {
    /// Create a feedback record and return it with the generated id.
    async fn create_feedback(&self, new: NewFeedback) -> Result<FeedbackRecord, FeedrelayError>;

    /// Fetch a record by id. `None` when no such record exists.
    async fn get_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>, FeedrelayError>;

    /// Count records for `email` that are still open (not archived).
    async fn count_open(&self, email: &str) -> Result<u32, FeedrelayError>;

    /// Fill subject/message/name in place, taking the record out of draft
    /// state. Returns `false` when the id references no record.
    async fn finalize_feedback(
        &self,
        id: &str,
        subject: &str,
        message: &str,
        name: Option<&str>,
    ) -> Result<bool, FeedrelayError>;

    /// Stamp `archived_at` and `external_message_id` in one update,
    /// conditional on the record not already being archived. Returns `true`
    /// iff this call performed the stamp — a `false` means another delivery
    /// won the race and the record must not be re-sent.
    async fn mark_archived(
        &self,
        id: &str,
        archived_at: DateTime<Utc>,
        external_message_id: &str,
    ) -> Result<bool, FeedrelayError>;

    /// Delete a record together with its upload children.
    async fn delete_feedback(&self, id: &str) -> Result<(), FeedrelayError>;

    /// Append one upload child. Returns the child id.
    async fn add_upload(&self, feedback_id: &str, upload: NewUpload)
        -> Result<i64, FeedrelayError>;

    /// Count non-placeholder upload children of a record.
    async fn count_uploads(&self, feedback_id: &str) -> Result<u32, FeedrelayError>;

    /// List all upload children of a record, placeholders included.
    async fn list_uploads(&self, feedback_id: &str) -> Result<Vec<UploadRecord>, FeedrelayError>;

    /// Archived records whose `archived_at` is at or before `cutoff`.
    async fn archived_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError>;

    /// Draft records (never finalized) created at or before `cutoff`.
    async fn drafts_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError>;

    /// Finalized but unarchived records created at or before `cutoff` --
    /// the "stuck" records the caretaker re-triggers.
    async fn stuck_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError>;

    /// All finalized but unarchived records, regardless of age.
    async fn undelivered(&self) -> Result<Vec<FeedbackRecord>, FeedrelayError>;
}
