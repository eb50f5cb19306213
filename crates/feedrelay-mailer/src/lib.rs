// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification delivery for the feedrelay service.
//!
//! Everything between a notification event and a delivered email: message
//! composition, the Mailgun and SMTP transports, the idempotent delivery
//! handler, and the queue-consumer worker that drives it.

pub mod compose;
pub mod delivery;
pub mod mailgun;
pub mod smtp;
pub mod worker;

use std::sync::Arc;

use feedrelay_config::model::{MailTransportKind, MailerConfig};
use feedrelay_core::{FeedrelayError, MailSender};

pub use delivery::{DeliveryHandler, DeliveryOutcome};
pub use mailgun::MailgunSender;
pub use smtp::SmtpSender;
pub use worker::DeliveryWorker;

/// Build the configured mail transport.
pub fn build_sender(config: &MailerConfig) -> Result<Arc<dyn MailSender>, FeedrelayError> {
    if config.sender.is_empty() {
        return Err(FeedrelayError::Config(
            "mailer.sender must be set".to_string(),
        ));
    }
    if config.recipient.is_empty() {
        return Err(FeedrelayError::Config(
            "mailer.recipient must be set".to_string(),
        ));
    }
    match config.transport {
        MailTransportKind::Mailgun => Ok(Arc::new(MailgunSender::new(&config.mailgun)?)),
        MailTransportKind::Smtp => Ok(Arc::new(SmtpSender::new(&config.smtp)?)),
    }
}
