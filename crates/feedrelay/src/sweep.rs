// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `feedrelay sweep` command implementation.
//!
//! One-shot caretaker run for external schedulers that prefer exec over
//! HTTP. Uses the same store, channel, and policy as the serve path; the
//! republished notifications are picked up by the next running server.

use std::sync::Arc;

use tracing::info;

use feedrelay_caretaker::{Caretaker, CaretakerPolicy};
use feedrelay_config::FeedrelayConfig;
use feedrelay_core::error::FeedrelayError;
use feedrelay_core::{EventChannel, RecordStore, ServiceAdapter};
use feedrelay_storage::{QueueChannel, SqliteRecordStore};

/// Runs one reconciliation sweep and prints the report.
pub async fn run_sweep(config: FeedrelayConfig) -> Result<(), FeedrelayError> {
    crate::serve::init_tracing(&config.service.log_level);

    let store = Arc::new(SqliteRecordStore::new(config.storage.clone()));
    store.initialize().await?;

    let channel = Arc::new(QueueChannel::new(store.database()?, &config.delivery.queue));

    let caretaker = Caretaker::new(
        store.clone() as Arc<dyn RecordStore>,
        channel as Arc<dyn EventChannel>,
        CaretakerPolicy::from_config(&config.caretaker),
    );

    let report = caretaker.sweep().await?;
    info!(
        expired = report.expired,
        reaped = report.reaped,
        republished = report.republished,
        "sweep finished"
    );
    println!(
        "{}",
        serde_json::to_string(&report).unwrap_or_else(|_| "sweep finished".to_string())
    );

    store.shutdown().await?;
    Ok(())
}
