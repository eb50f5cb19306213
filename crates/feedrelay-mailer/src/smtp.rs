// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP mail transport via lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox as LettreMailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use feedrelay_config::model::SmtpConfig;
use feedrelay_core::types::{Mailbox, OutboundEmail};
use feedrelay_core::{AdapterType, FeedrelayError, HealthStatus, MailSender, ServiceAdapter};

/// Mail transport over an SMTP relay (STARTTLS).
#[derive(Debug)]
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpSender {
    /// Create a sender from configuration. Fails when the relay host is
    /// missing or invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, FeedrelayError> {
        if config.host.is_empty() {
            return Err(FeedrelayError::Config(
                "mailer.smtp.host must be set".to_string(),
            ));
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| FeedrelayError::Config(format!("invalid SMTP relay: {e}")))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }

    fn transport_err(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> FeedrelayError {
        FeedrelayError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Convert the transport-neutral mailbox into lettre's, going through the
/// typed constructor so display names never need RFC quoting by hand.
fn to_lettre_mailbox(mailbox: &Mailbox) -> Result<LettreMailbox, FeedrelayError> {
    let address = mailbox
        .address
        .parse()
        .map_err(|e| FeedrelayError::Validation(format!("bad mail address `{}`: {e}", mailbox.address)))?;
    Ok(LettreMailbox::new(mailbox.name.clone(), address))
}

#[async_trait]
impl ServiceAdapter for SmtpSender {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mailer
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedrelayError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Unhealthy("SMTP NOOP failed".to_string())),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("SMTP connect failed: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), FeedrelayError> {
        Ok(())
    }
}

#[async_trait]
impl MailSender for SmtpSender {
    async fn send(&self, email: &OutboundEmail) -> Result<String, FeedrelayError> {
        // SMTP assigns no id of its own; generate the Message-ID we hand
        // back as the transport id.
        let message_id = format!("{}@{}", uuid::Uuid::new_v4(), self.host);

        let builder = Message::builder()
            .from(to_lettre_mailbox(&email.from)?)
            .reply_to(to_lettre_mailbox(&email.reply_to)?)
            .to(to_lettre_mailbox(&email.to)?)
            .subject(email.subject.clone())
            .message_id(Some(format!("<{message_id}>")));

        let message = if email.attachments.is_empty() {
            builder
                .body(email.body.clone())
                .map_err(|e| Self::transport_err("building message failed", e))?
        } else {
            let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
            for attachment in &email.attachments {
                let content_type = if attachment.content_type.is_empty() {
                    ContentType::parse("application/octet-stream")
                } else {
                    ContentType::parse(&attachment.content_type)
                }
                .map_err(|e| Self::transport_err("invalid attachment MIME type", e))?;

                multipart = multipart.singlepart(
                    Attachment::new(attachment.filename.clone())
                        .body(attachment.data.clone(), content_type),
                );
            }
            builder
                .multipart(multipart)
                .map_err(|e| Self::transport_err("building message failed", e))?
        };

        self.transport
            .send(message)
            .await
            .map_err(|e| Self::transport_err("SMTP send failed", e))?;

        Ok(message_id)
    }
}
