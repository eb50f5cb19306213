// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mailgun REST API mail transport.

use async_trait::async_trait;
use serde::Deserialize;

use feedrelay_config::model::MailgunConfig;
use feedrelay_core::types::OutboundEmail;
use feedrelay_core::{AdapterType, FeedrelayError, HealthStatus, MailSender, ServiceAdapter};

const API_AUTH_USER: &str = "api";
const ORIGIN_MAILER: &str = "feedrelay-mailer";

/// Mail transport over the Mailgun messages API.
#[derive(Debug)]
pub struct MailgunSender {
    client: reqwest::Client,
    messages_url: String,
    api_key: String,
}

/// Successful response body of the messages endpoint.
#[derive(Debug, Deserialize)]
struct MailgunResponse {
    /// Message id, angle-bracketed: `<id@domain>`.
    id: String,
}

impl MailgunSender {
    /// Create a sender from configuration. Fails when the domain or API key
    /// is missing.
    pub fn new(config: &MailgunConfig) -> Result<Self, FeedrelayError> {
        if config.api_domain.is_empty() {
            return Err(FeedrelayError::Config(
                "mailer.mailgun.api_domain must be set".to_string(),
            ));
        }
        let api_key = config.api_key.clone().ok_or_else(|| {
            FeedrelayError::Config("mailer.mailgun.api_key must be set".to_string())
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            messages_url: format!(
                "{}/v3/{}/messages",
                config.base_url.trim_end_matches('/'),
                config.api_domain
            ),
            api_key,
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

#[async_trait]
impl ServiceAdapter for MailgunSender {
    fn name(&self) -> &str {
        "mailgun"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mailer
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedrelayError> {
        // Constructed senders are fully configured; no probe request is made
        // since Mailgun bills per API call.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedrelayError> {
        Ok(())
    }
}

#[async_trait]
impl MailSender for MailgunSender {
    async fn send(&self, email: &OutboundEmail) -> Result<String, FeedrelayError> {
        let from = email.from.to_string();
        let reply_to = email.reply_to.to_string();

        let mut form = reqwest::multipart::Form::new()
            .text("from", from.clone())
            .text("to", email.to.to_string())
            .text("subject", email.subject.clone())
            .text("text", email.body.clone())
            // Prevent some mail clients from showing "on behalf of".
            .text("h:sender", from)
            // Allow "reply all" to include the requester.
            .text("h:reply-to", reply_to)
            .text("h:X-Origin-Mailer", ORIGIN_MAILER);

        for attachment in &email.attachments {
            let mut part = reqwest::multipart::Part::bytes(attachment.data.clone())
                .file_name(attachment.filename.clone());
            if !attachment.content_type.is_empty() {
                part = part
                    .mime_str(&attachment.content_type)
                    .map_err(|e| Self::transport_err("invalid attachment MIME type", e))?;
            }
            form = form.part("attachment", part);
        }

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(API_AUTH_USER, Some(&self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::transport_err("Mailgun API request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedrelayError::Transport {
                message: format!("Mailgun API returned {status}: {body}"),
                source: None,
            });
        }

        let body: MailgunResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_err("Mailgun API response was not valid JSON", e))?;

        // Unwrap the angle-bracketed message id.
        Ok(body
            .id
            .trim_start_matches('<')
            .trim_end_matches('>')
            .to_string())
    }
}
