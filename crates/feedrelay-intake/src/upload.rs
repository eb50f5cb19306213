// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upload ingestion: creates or extends a draft record as attachments arrive.

use chrono::Utc;
use tracing::{info, warn};

use feedrelay_config::model::LimitsConfig;
use feedrelay_core::types::{NewFeedback, NewUpload};
use feedrelay_core::{FeedrelayError, RecordStore};

/// One upload call, after the gateway has verified the caller's identity.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Verified requester email.
    pub email: String,
    /// Client address recorded on newly created records.
    pub client_ip: String,
    /// Attachment filename.
    pub filename: String,
    /// Raw attachment bytes.
    pub data: Vec<u8>,
    /// Correlation token from an earlier upload call, if any.
    pub token: Option<String>,
}

/// Ingest one upload, creating a draft record on the first call of a
/// submission and appending to it on subsequent calls.
///
/// Returns the correlation token (echoed or newly generated). Exactly one
/// upload child is appended per successful call; validation and quota
/// failures leave no trace.
pub async fn ingest_upload(
    store: &dyn RecordStore,
    limits: &LimitsConfig,
    req: UploadRequest,
) -> Result<String, FeedrelayError> {
    if req.filename.is_empty() {
        return Err(FeedrelayError::Validation(
            "upload filename must not be empty".to_string(),
        ));
    }
    if req.data.is_empty() {
        return Err(FeedrelayError::Validation(
            "upload payload must not be empty".to_string(),
        ));
    }
    if req.data.len() > limits.max_upload_size {
        return Err(FeedrelayError::Validation(format!(
            "upload payload of {} bytes exceeds the {} byte limit",
            req.data.len(),
            limits.max_upload_size
        )));
    }

    match req.token {
        Some(token) => {
            // The token must reference an existing record.
            let record = store
                .get_feedback(&token)
                .await?
                .ok_or_else(|| FeedrelayError::NotFound { id: token.clone() })?;

            // Past the attachment cap the upload is still accepted, but its
            // payload is replaced with a placeholder so the client's upload
            // sequence always completes and can still reach the comment call.
            let upload = if store.count_uploads(&record.id).await? >= limits.max_uploads {
                warn!(email = %req.email, feedback_id = %record.id, "too many uploads");
                NewUpload::ignored_placeholder(&req.filename, limits.max_uploads)
            } else {
                NewUpload::new(&req.filename, req.data)
            };

            store.add_upload(&record.id, upload).await?;
            info!(
                email = %req.email,
                feedback_id = %record.id,
                filename = %req.filename,
                "upload appended"
            );
            Ok(token)
        }
        None => {
            let open = store.count_open(&req.email).await?;
            if open >= limits.max_pending {
                return Err(FeedrelayError::QuotaExceeded {
                    email: req.email,
                    open,
                });
            }

            let record = store
                .create_feedback(NewFeedback::draft(&req.email, &req.client_ip, Utc::now()))
                .await?;
            store
                .add_upload(&record.id, NewUpload::new(&req.filename, req.data))
                .await?;
            info!(
                email = %req.email,
                feedback_id = %record.id,
                filename = %req.filename,
                "draft created with first upload"
            );
            Ok(record.id)
        }
    }
}
