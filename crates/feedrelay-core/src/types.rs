// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the feedrelay service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a capability trait.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Channel,
    Mailer,
}

/// One feedback submission: the durable record that correlates a sequence of
/// upload calls with a terminal comment call.
///
/// The record id doubles as the correlation token handed to the client.
/// Optional fields are `None` until the lifecycle step that sets them runs:
/// `subject`/`message`/`name` are filled by comment finalization,
/// `archived_at`/`external_message_id` by notification delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub email: String,
    pub client_ip: String,
    pub created_at: DateTime<Utc>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub name: Option<String>,
    pub has_uploads: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub external_message_id: Option<String>,
}

impl FeedbackRecord {
    /// A draft has been created by an upload call but not yet finalized by a
    /// comment call.
    pub fn is_draft(&self) -> bool {
        self.message.is_none()
    }

    /// An archived record has been delivered by email; the state is terminal.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Fields for creating a new feedback record. The store generates the id.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub email: String,
    pub client_ip: String,
    pub created_at: DateTime<Utc>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub name: Option<String>,
    pub has_uploads: bool,
}

impl NewFeedback {
    /// A draft record, created by the first upload call of a submission.
    pub fn draft(email: &str, client_ip: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            client_ip: client_ip.to_string(),
            created_at,
            subject: None,
            message: None,
            name: None,
            has_uploads: true,
        }
    }

    /// A record created directly in finalized form by a comment call with no
    /// prior uploads.
    pub fn finalized(
        email: &str,
        client_ip: &str,
        created_at: DateTime<Utc>,
        subject: &str,
        message: &str,
        name: Option<&str>,
    ) -> Self {
        Self {
            email: email.to_string(),
            client_ip: client_ip.to_string(),
            created_at,
            subject: Some(subject.to_string()),
            message: Some(message.to_string()),
            name: name.map(str::to_string),
            has_uploads: false,
        }
    }
}

/// One file attached to a feedback record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub id: i64,
    pub feedback_id: String,
    pub filename: String,
    pub data: Vec<u8>,
    pub content_length: i64,
    pub ignored: bool,
}

/// Fields for appending a new upload child. `content_length` is derived from
/// the payload by the store.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub filename: String,
    pub data: Vec<u8>,
    pub ignored: bool,
}

impl NewUpload {
    pub fn new(filename: &str, data: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            data,
            ignored: false,
        }
    }

    /// A placeholder for an upload past the per-record attachment cap. The
    /// call is accepted so the client's upload sequence still completes, but
    /// the payload is replaced with a short notice.
    pub fn ignored_placeholder(filename: &str, max_uploads: u32) -> Self {
        Self {
            filename: filename.to_string(),
            data: format!("This upload was ignored; upload limit is {max_uploads}").into_bytes(),
            ignored: true,
        }
    }
}

/// Why a notification event was published.
///
/// The action only affects logging; the delivery handler's idempotency guard
/// governs the outcome either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum FeedbackAction {
    #[serde(rename = "feedbackSubmitted")]
    #[strum(serialize = "feedbackSubmitted")]
    Submitted,
    #[serde(rename = "caretakerRetry")]
    #[strum(serialize = "caretakerRetry")]
    CaretakerRetry,
}

/// A notification that a feedback record wants delivery. Transient: the
/// channel persists it, this service does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "feedbackAction")]
    pub action: FeedbackAction,
    #[serde(rename = "feedbackDocId")]
    pub feedback_id: String,
}

impl NotificationEvent {
    pub fn submitted(feedback_id: &str) -> Self {
        Self {
            action: FeedbackAction::Submitted,
            feedback_id: feedback_id.to_string(),
        }
    }

    pub fn caretaker_retry(feedback_id: &str) -> Self {
        Self {
            action: FeedbackAction::CaretakerRetry,
            feedback_id: feedback_id.to_string(),
        }
    }

    /// Wire encoding used on the notification channel.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("notification event serializes")
    }

    /// Decode a channel payload. Unknown actions and missing fields fail
    /// here; consumers drop such messages rather than retrying them.
    pub fn decode(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// One message handed to a channel consumer. `id` is the channel's delivery
/// handle, passed back to `ack`/`nack`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDelivery {
    pub id: i64,
    pub payload: String,
}

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn new(address: &str) -> Self {
        Self {
            name: None,
            address: address.to_string(),
        }
    }

    pub fn named(name: &str, address: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            address: address.to_string(),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if name.contains(['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"']) => {
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{}\" <{}>", escaped, self.address)
            }
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// One attachment on an outbound email. `content_type` may be empty when the
/// type could not be inferred from the filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A fully composed outbound email, ready for a mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: Mailbox,
    pub reply_to: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<EmailAttachment>,
}
