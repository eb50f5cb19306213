// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue-consumer loop feeding the delivery handler.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use feedrelay_core::{EventChannel, FeedrelayError};

use crate::delivery::DeliveryHandler;

/// Background worker draining the notification channel.
///
/// Polls the channel, hands each delivery to the [`DeliveryHandler`], and
/// acks or nacks per the outcome: every resolved outcome acks (including
/// transport failure, which the caretaker repairs on its own schedule);
/// only a store error while handling nacks, so the channel redelivers.
pub struct DeliveryWorker {
    channel: Arc<dyn EventChannel>,
    handler: Arc<DeliveryHandler>,
    poll_interval: Duration,
}

impl DeliveryWorker {
    pub fn new(
        channel: Arc<dyn EventChannel>,
        handler: Arc<DeliveryHandler>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            channel,
            handler,
            poll_interval,
        }
    }

    /// Run until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("delivery worker started");
        loop {
            if cancel.is_cancelled() {
                break;
            }

            match self.channel.poll().await {
                Ok(Some(delivery)) => {
                    self.process(delivery.id, &delivery.payload).await;
                }
                Ok(None) => {
                    // Queue empty: sleep, but wake immediately on shutdown.
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
                Err(e) => {
                    error!(error = %e, "polling notification channel failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
            }
        }
        info!("delivery worker stopped");
    }

    /// Drain everything currently in the channel, then return. Used by
    /// tests and the one-shot CLI path.
    pub async fn drain(&self) -> Result<usize, FeedrelayError> {
        let mut processed = 0;
        while let Some(delivery) = self.channel.poll().await? {
            self.process(delivery.id, &delivery.payload).await;
            processed += 1;
        }
        Ok(processed)
    }

    async fn process(&self, delivery_id: i64, payload: &str) {
        match self.handler.handle_payload(payload).await {
            Ok(outcome) => {
                debug!(delivery_id, ?outcome, "delivery resolved");
                if let Err(e) = self.channel.ack(delivery_id).await {
                    error!(delivery_id, error = %e, "ack failed");
                }
            }
            Err(e) => {
                error!(delivery_id, error = %e, "delivery failed; requeueing");
                if let Err(e) = self.channel.nack(delivery_id).await {
                    error!(delivery_id, error = %e, "nack failed");
                }
            }
        }
    }
}
