// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comment finalization: completes a draft (or creates a record with no
//! attachments) and triggers a submitted notification.

use chrono::Utc;
use tracing::info;

use feedrelay_config::model::LimitsConfig;
use feedrelay_core::types::{NewFeedback, NotificationEvent};
use feedrelay_core::{EventChannel, FeedrelayError, RecordStore};

/// One comment call, after the gateway has verified the caller's identity.
#[derive(Debug, Clone)]
pub struct CommentRequest {
    /// Verified requester email.
    pub email: String,
    /// Client address recorded on newly created records.
    pub client_ip: String,
    /// Feedback subject line.
    pub subject: String,
    /// Feedback message body.
    pub body: String,
    /// Optional requester display name.
    pub name: Option<String>,
    /// Correlation token from prior upload calls, if any.
    pub token: Option<String>,
}

/// Finalize one submission: fill subject/message/name on the referenced
/// draft, or create a new record directly in finalized form when no uploads
/// preceded the comment. Publishes a `Submitted` notification on success.
///
/// Returns the record id. If the store mutation succeeds but the publish
/// fails, the error is `Channel` and the record is left finalized but
/// un-notified -- exactly the state the caretaker sweep repairs.
pub async fn finalize_comment(
    store: &dyn RecordStore,
    channel: &dyn EventChannel,
    limits: &LimitsConfig,
    req: CommentRequest,
) -> Result<String, FeedrelayError> {
    if req.email.is_empty() {
        return Err(FeedrelayError::Validation(
            "requester email must not be empty".to_string(),
        ));
    }
    if req.subject.is_empty() {
        return Err(FeedrelayError::Validation(
            "feedback subject must not be empty".to_string(),
        ));
    }
    if req.body.is_empty() {
        return Err(FeedrelayError::Validation(
            "feedback body must not be empty".to_string(),
        ));
    }

    let feedback_id = match req.token {
        Some(token) => {
            // Update the draft created by the upload calls: this is the
            // transition out of draft state.
            let found = store
                .finalize_feedback(&token, &req.subject, &req.body, req.name.as_deref())
                .await?;
            if !found {
                return Err(FeedrelayError::NotFound { id: token });
            }
            info!(email = %req.email, feedback_id = %token, "draft finalized");
            token
        }
        None => {
            // No prior uploads: the quota re-check mirrors the one in upload
            // ingestion (the two checks are independent, not exclusive).
            let open = store.count_open(&req.email).await?;
            if open >= limits.max_pending {
                return Err(FeedrelayError::QuotaExceeded {
                    email: req.email,
                    open,
                });
            }

            let record = store
                .create_feedback(NewFeedback::finalized(
                    &req.email,
                    &req.client_ip,
                    Utc::now(),
                    &req.subject,
                    &req.body,
                    req.name.as_deref(),
                ))
                .await?;
            info!(email = %req.email, feedback_id = %record.id, "feedback created without uploads");
            record.id
        }
    };

    channel
        .publish(&NotificationEvent::submitted(&feedback_id))
        .await?;

    Ok(feedback_id)
}
