// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `feedrelay serve` command implementation.
//!
//! Wires the SQLite record store, the queue-backed notification channel,
//! the configured mail transport, the delivery worker, and the HTTP
//! gateway, then serves until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use feedrelay_caretaker::{Caretaker, CaretakerPolicy};
use feedrelay_config::FeedrelayConfig;
use feedrelay_core::error::FeedrelayError;
use feedrelay_core::{EventChannel, RecordStore, ServiceAdapter};
use feedrelay_gateway::{GatewayState, ServerConfig, start_server};
use feedrelay_mailer::{DeliveryHandler, DeliveryWorker};
use feedrelay_storage::{QueueChannel, SqliteRecordStore};

/// Runs the `feedrelay serve` command.
///
/// Initializes all adapters, spawns the delivery worker and the gateway
/// server, and blocks until ctrl-c. Shutdown drains nothing: every
/// component is crash-safe by design, so in-flight work is simply picked
/// up again on the next start.
pub async fn run_serve(config: FeedrelayConfig) -> Result<(), FeedrelayError> {
    init_tracing(&config.service.log_level);

    info!("starting feedrelay serve");

    if config.auth.shared_secret.is_none() {
        warn!("auth.shared_secret is not set -- all submissions will be rejected");
    }

    // Record store (initializes the database and runs migrations).
    let store = Arc::new(SqliteRecordStore::new(config.storage.clone()));
    store.initialize().await?;

    // Notification channel over the same database file.
    let channel = Arc::new(QueueChannel::new(store.database()?, &config.delivery.queue));

    // Outbound mail transport and the idempotent delivery handler.
    let mailer = feedrelay_mailer::build_sender(&config.mailer)?;
    let deliverer = Arc::new(DeliveryHandler::new(
        store.clone() as Arc<dyn RecordStore>,
        mailer,
        &config.mailer.sender,
        &config.mailer.recipient,
    ));

    let caretaker = Arc::new(Caretaker::new(
        store.clone() as Arc<dyn RecordStore>,
        channel.clone() as Arc<dyn EventChannel>,
        CaretakerPolicy::from_config(&config.caretaker),
    ));

    // Delivery worker task.
    let cancel = CancellationToken::new();
    let worker = DeliveryWorker::new(
        channel.clone() as Arc<dyn EventChannel>,
        deliverer.clone(),
        Duration::from_millis(config.delivery.poll_interval_ms),
    );
    let worker_handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run(cancel).await }
    });

    // Gateway server task.
    let state = GatewayState {
        store: store.clone(),
        channel: channel.clone(),
        caretaker,
        deliverer,
        limits: config.limits.clone(),
        shared_secret: config.auth.shared_secret.clone(),
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(&server_config, state).await {
            error!(error = %e, "gateway server error");
        }
    });

    // Block until interrupted.
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");

    cancel.cancel();
    if let Err(e) = worker_handle.await {
        error!(error = %e, "delivery worker did not stop cleanly");
    }
    server_handle.abort();

    store.shutdown().await?;
    info!("feedrelay stopped");
    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("feedrelay={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
