// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The idempotent delivery handler.
//!
//! Consumes notification events, forwards the referenced feedback by email,
//! and stamps the record archived. Safe under at-least-once delivery: the
//! archived stamp is both the audit trail and the idempotency marker, and a
//! duplicate event observing it is a no-op.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use feedrelay_core::types::NotificationEvent;
use feedrelay_core::{FeedrelayError, MailSender, RecordStore};

use crate::compose;

/// What one delivery attempt did. Everything except a propagated store error
/// consumes the event; `TransportFailed` leaves the record untouched for the
/// caretaker to re-trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Email accepted by the transport and the record stamped.
    Sent { message_id: String },
    /// The record was already archived; nothing was sent.
    AlreadyArchived,
    /// Terminal, logged condition (unparsable event, unknown record,
    /// still-open draft). Retrying cannot help, so the event is consumed.
    Dropped,
    /// The transport refused the message. The record was NOT mutated, so a
    /// later caretaker retry can deliver it.
    TransportFailed,
}

/// Stateless notification consumer over the capability traits.
pub struct DeliveryHandler {
    store: Arc<dyn RecordStore>,
    mailer: Arc<dyn MailSender>,
    sender: String,
    recipient: String,
}

impl DeliveryHandler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        mailer: Arc<dyn MailSender>,
        sender: &str,
        recipient: &str,
    ) -> Self {
        Self {
            store,
            mailer,
            sender: sender.to_string(),
            recipient: recipient.to_string(),
        }
    }

    /// Handle one raw channel payload.
    ///
    /// Payloads that do not decode into a known notification event are not
    /// ours to process (the channel may carry foreign messages); they are
    /// logged and consumed.
    pub async fn handle_payload(&self, payload: &str) -> Result<DeliveryOutcome, FeedrelayError> {
        match NotificationEvent::decode(payload) {
            Ok(event) => self.handle_event(&event).await,
            Err(e) => {
                warn!(error = %e, "notification payload ignored: not a feedback event");
                Ok(DeliveryOutcome::Dropped)
            }
        }
    }

    /// Handle one decoded notification event.
    ///
    /// Only store failures propagate as `Err` (the caller should nack for
    /// redelivery); every other condition resolves to an outcome.
    pub async fn handle_event(
        &self,
        event: &NotificationEvent,
    ) -> Result<DeliveryOutcome, FeedrelayError> {
        debug!(action = %event.action, feedback_id = %event.feedback_id, "delivery triggered");

        let Some(record) = self.store.get_feedback(&event.feedback_id).await? else {
            warn!(feedback_id = %event.feedback_id, "feedback record not found; event dropped");
            return Ok(DeliveryOutcome::Dropped);
        };

        self.deliver(&record).await
    }

    /// Deliver one loaded record, honoring the idempotency guard.
    async fn deliver(
        &self,
        record: &feedrelay_core::FeedbackRecord,
    ) -> Result<DeliveryOutcome, FeedrelayError> {
        // Idempotency guard: an archived record has already been delivered.
        // This check is what makes at-least-once delivery safe to retry.
        if record.is_archived() {
            debug!(feedback_id = %record.id, "already archived; skipping");
            return Ok(DeliveryOutcome::AlreadyArchived);
        }

        // Defensive field check: a still-open draft (or a record missing its
        // requester) cannot be forwarded, and retrying will not fill the
        // missing data.
        if record.email.is_empty()
            || record.subject.as_deref().unwrap_or_default().is_empty()
            || record.message.as_deref().unwrap_or_default().is_empty()
        {
            warn!(feedback_id = %record.id, "record has unset fields; event dropped");
            return Ok(DeliveryOutcome::Dropped);
        }

        let uploads = if record.has_uploads {
            self.store.list_uploads(&record.id).await?
        } else {
            Vec::new()
        };

        let email = compose::compose(record, &uploads, &self.sender, &self.recipient)?;

        info!(
            feedback_id = %record.id,
            reply_to = %email.reply_to,
            attachments = email.attachments.len(),
            "forwarding feedback"
        );

        let message_id = match self.mailer.send(&email).await {
            Ok(message_id) => message_id,
            Err(e) => {
                // No record mutation: archived_at stays unset, so the
                // caretaker can re-trigger delivery later.
                warn!(feedback_id = %record.id, error = %e, "transport refused message");
                return Ok(DeliveryOutcome::TransportFailed);
            }
        };

        let stamped = self
            .store
            .mark_archived(&record.id, Utc::now(), &message_id)
            .await?;
        if !stamped {
            // A concurrent delivery won the stamp race after our guard check.
            // Both sends may have gone out -- the accepted at-least-once gap.
            warn!(feedback_id = %record.id, "record archived concurrently; duplicate send possible");
            return Ok(DeliveryOutcome::AlreadyArchived);
        }

        info!(feedback_id = %record.id, message_id = %message_id, "feedback archived");
        Ok(DeliveryOutcome::Sent { message_id })
    }

    /// Deliver every finalized-but-unarchived record right now, regardless
    /// of age. Returns the number of emails sent.
    pub async fn flush(&self) -> Result<usize, FeedrelayError> {
        let records = self.store.undelivered().await?;
        let mut sent = 0;
        for record in records {
            if matches!(self.deliver(&record).await?, DeliveryOutcome::Sent { .. }) {
                sent += 1;
            }
        }
        Ok(sent)
    }
}
