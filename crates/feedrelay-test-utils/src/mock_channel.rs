// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification channel for deterministic testing.
//!
//! `MockChannel` implements `EventChannel` with an in-memory queue, captured
//! published events for assertion, and a switch to make publishing fail.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use feedrelay_core::types::{EventDelivery, NotificationEvent};
use feedrelay_core::{AdapterType, EventChannel, FeedrelayError, HealthStatus, ServiceAdapter};

/// An in-memory `EventChannel` fake.
///
/// Published events are both recorded (for assertions via `published()`)
/// and enqueued (so a consumer loop can drain them). `nack` re-queues at
/// the back, mimicking redelivery.
pub struct MockChannel {
    queue: Mutex<VecDeque<EventDelivery>>,
    published: Mutex<Vec<NotificationEvent>>,
    acked: Mutex<Vec<i64>>,
    nacked: Mutex<Vec<i64>>,
    next_id: AtomicI64,
    fail_publish: AtomicBool,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            published: Mutex::new(Vec::new()),
            acked: Mutex::new(Vec::new()),
            nacked: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_publish: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `publish` fail with a channel error.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Inject a raw payload, bypassing `publish` -- for feeding consumers
    /// malformed or foreign messages.
    pub async fn inject_payload(&self, payload: &str) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().await.push_back(EventDelivery {
            id,
            payload: payload.to_string(),
        });
        id
    }

    /// All events that went through `publish`.
    pub async fn published(&self) -> Vec<NotificationEvent> {
        self.published.lock().await.clone()
    }

    /// Count of events that went through `publish`.
    pub async fn published_count(&self) -> usize {
        self.published.lock().await.len()
    }

    /// Delivery ids that were acked.
    pub async fn acked(&self) -> Vec<i64> {
        self.acked.lock().await.clone()
    }

    /// Delivery ids that were nacked.
    pub async fn nacked(&self) -> Vec<i64> {
        self.nacked.lock().await.clone()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedrelayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedrelayError> {
        Ok(())
    }
}

#[async_trait]
impl EventChannel for MockChannel {
    async fn publish(&self, event: &NotificationEvent) -> Result<(), FeedrelayError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(FeedrelayError::Channel {
                message: "mock publish failure injected".to_string(),
                source: None,
            });
        }
        self.published.lock().await.push(event.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().await.push_back(EventDelivery {
            id,
            payload: event.encode(),
        });
        Ok(())
    }

    async fn poll(&self) -> Result<Option<EventDelivery>, FeedrelayError> {
        Ok(self.queue.lock().await.pop_front())
    }

    async fn ack(&self, delivery_id: i64) -> Result<(), FeedrelayError> {
        self.acked.lock().await.push(delivery_id);
        Ok(())
    }

    async fn nack(&self, delivery_id: i64) -> Result<(), FeedrelayError> {
        self.nacked.lock().await.push(delivery_id);
        Ok(())
    }
}
