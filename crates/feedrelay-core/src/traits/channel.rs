// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification channel trait: publish/consume over an at-least-once queue.

use async_trait::async_trait;

use crate::error::FeedrelayError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{EventDelivery, NotificationEvent};

/// An at-least-once notification channel.
///
/// The channel may redeliver a published event any number of times and in
/// any order; consumers must be idempotent. A delivery stays leased to its
/// consumer until `ack` (done, never redeliver) or `nack` (failed, eligible
/// for redelivery) -- a consumer that crashes mid-lease gets the event
/// redelivered once the lease expires.
#[async_trait]
pub trait EventChannel: ServiceAdapter {
    /// Publish an event. Returns only once the channel has durably accepted
    /// it; an error means the event was not published.
    async fn publish(&self, event: &NotificationEvent) -> Result<(), FeedrelayError>;

    /// Take the next available delivery, if any. Non-blocking: `None` means
    /// the channel is currently empty.
    async fn poll(&self) -> Result<Option<EventDelivery>, FeedrelayError>;

    /// Acknowledge a delivery as fully processed.
    async fn ack(&self, delivery_id: i64) -> Result<(), FeedrelayError>;

    /// Report a delivery as failed; the channel schedules redelivery until
    /// its attempt budget is exhausted.
    async fn nack(&self, delivery_id: i64) -> Result<(), FeedrelayError>;
}
