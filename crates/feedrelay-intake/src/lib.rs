// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submission intake for the feedrelay service.
//!
//! The two client-facing entry points of the feedback lifecycle: upload
//! ingestion (creates/extends a draft as attachments arrive) and comment
//! finalization (completes the draft and triggers the submitted
//! notification). Both operate purely over the capability traits; the
//! gateway authenticates callers and translates errors to wire codes.
//!
//! The entry points are stateless and may run concurrently with any number
//! of instances of themselves. The `max_pending` and `max_uploads` caps are
//! check-then-act soft limits: concurrent requests can race past them.

pub mod comment;
pub mod upload;

pub use comment::{CommentRequest, finalize_comment};
pub use upload::{UploadRequest, ingest_upload};
