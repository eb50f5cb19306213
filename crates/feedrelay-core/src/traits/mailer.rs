// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail sender trait for outbound email transports.

use async_trait::async_trait;

use crate::error::FeedrelayError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::OutboundEmail;

/// An outbound email transport.
///
/// Accepts a composed message with attachments and returns the
/// transport-assigned message id, or fails without side effects on the
/// record store.
#[async_trait]
pub trait MailSender: ServiceAdapter + std::fmt::Debug {
    /// Send one email. Returns the transport's message id on acceptance.
    async fn send(&self, email: &OutboundEmail) -> Result<String, FeedrelayError>;
}
