// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock mail transport for deterministic testing.
//!
//! `MockMailer` implements `MailSender`, capturing sent messages and
//! optionally failing every send.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use feedrelay_core::types::OutboundEmail;
use feedrelay_core::{AdapterType, FeedrelayError, HealthStatus, MailSender, ServiceAdapter};

/// An in-memory `MailSender` fake.
#[derive(Debug)]
pub struct MockMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl MockMailer {
    /// Create a new mock mailer.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent send fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All messages accepted by `send`.
    pub async fn sent_messages(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    /// Count of messages accepted by `send`.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockMailer {
    fn name(&self) -> &str {
        "mock-mailer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mailer
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedrelayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedrelayError> {
        Ok(())
    }
}

#[async_trait]
impl MailSender for MockMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, FeedrelayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FeedrelayError::Transport {
                message: "mock transport failure injected".to_string(),
                source: None,
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push(email.clone());
        Ok(format!("mock-message-{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedrelay_core::types::Mailbox;

    fn make_email() -> OutboundEmail {
        OutboundEmail {
            from: Mailbox::new("relay@example.com"),
            reply_to: Mailbox::named("Ann", "ann@example.com"),
            to: Mailbox::new("support@example.com"),
            subject: "Bug".into(),
            body: "Crashes".into(),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn send_captures_messages_and_assigns_ids() {
        let mailer = MockMailer::new();
        let id1 = mailer.send(&make_email()).await.unwrap();
        let id2 = mailer.send(&make_email()).await.unwrap();

        assert_ne!(id1, id2);
        assert_eq!(mailer.sent_count().await, 2);
        assert_eq!(mailer.sent_messages().await[0].subject, "Bug");
    }

    #[tokio::test]
    async fn failure_injection_returns_transport_error() {
        let mailer = MockMailer::new();
        mailer.set_failing(true);
        let err = mailer.send(&make_email()).await.unwrap_err();
        assert!(matches!(err, FeedrelayError::Transport { .. }));
        assert_eq!(mailer.sent_count().await, 0);
    }
}
