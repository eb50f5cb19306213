// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable notification channel backed by the crash-safe SQLite queue.
//!
//! Shares the record store's database file but is a distinct adapter: the
//! core only ever sees the `EventChannel` trait, so the queue could move to
//! an external broker without touching any consumer.

use async_trait::async_trait;
use tracing::debug;

use feedrelay_core::types::{EventDelivery, NotificationEvent};
use feedrelay_core::{AdapterType, EventChannel, FeedrelayError, HealthStatus, ServiceAdapter};

use crate::database::Database;
use crate::queries;

/// At-least-once notification channel over the embedded queue table.
pub struct QueueChannel {
    db: Database,
    queue_name: String,
}

impl QueueChannel {
    /// Create a channel over an already-initialized database.
    pub fn new(db: Database, queue_name: &str) -> Self {
        Self {
            db,
            queue_name: queue_name.to_string(),
        }
    }
}

#[async_trait]
impl ServiceAdapter for QueueChannel {
    fn name(&self) -> &str {
        "sqlite-queue"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedrelayError> {
        self.db
            .connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedrelayError> {
        // The database is owned by the record store adapter; nothing to do.
        Ok(())
    }
}

#[async_trait]
impl EventChannel for QueueChannel {
    async fn publish(&self, event: &NotificationEvent) -> Result<(), FeedrelayError> {
        let entry_id = queries::queue::enqueue(&self.db, &self.queue_name, &event.encode())
            .await
            .map_err(|e| FeedrelayError::Channel {
                message: format!("publish to queue `{}` failed", self.queue_name),
                source: Some(Box::new(e)),
            })?;
        debug!(
            entry_id,
            action = %event.action,
            feedback_id = %event.feedback_id,
            "notification published"
        );
        Ok(())
    }

    async fn poll(&self) -> Result<Option<EventDelivery>, FeedrelayError> {
        let entry = queries::queue::dequeue(&self.db, &self.queue_name).await?;
        Ok(entry.map(|e| EventDelivery {
            id: e.id,
            payload: e.payload,
        }))
    }

    async fn ack(&self, delivery_id: i64) -> Result<(), FeedrelayError> {
        queries::queue::ack(&self.db, delivery_id).await
    }

    async fn nack(&self, delivery_id: i64) -> Result<(), FeedrelayError> {
        queries::queue::fail(&self.db, delivery_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (QueueChannel, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("channel.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (QueueChannel::new(db, "notifications"), dir)
    }

    #[tokio::test]
    async fn publish_then_poll_returns_the_event() {
        let (channel, _dir) = setup().await;

        let event = NotificationEvent::submitted("rec-1");
        channel.publish(&event).await.unwrap();

        let delivery = channel.poll().await.unwrap().unwrap();
        let decoded = NotificationEvent::decode(&delivery.payload).unwrap();
        assert_eq!(decoded, event);

        channel.ack(delivery.id).await.unwrap();
        assert!(channel.poll().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nacked_delivery_comes_back() {
        let (channel, _dir) = setup().await;

        channel
            .publish(&NotificationEvent::caretaker_retry("rec-2"))
            .await
            .unwrap();

        let first = channel.poll().await.unwrap().unwrap();
        channel.nack(first.id).await.unwrap();

        let second = channel.poll().await.unwrap().unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.payload, first.payload);
    }

    #[tokio::test]
    async fn adapter_identity() {
        let (channel, _dir) = setup().await;
        assert_eq!(channel.name(), "sqlite-queue");
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
        assert_eq!(channel.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
