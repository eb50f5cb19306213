// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caretaker reconciliation: the periodic sweep that repairs partial
//! failures in the feedback lifecycle.
//!
//! Three independent scans, each using only conditional queries (no locks,
//! no transactions):
//! 1. **Expire**: delete archived records past the retention window.
//! 2. **Reap orphans**: delete drafts whose client never sent the comment
//!    call, once past a short grace window.
//! 3. **Retry stale**: republish a retry notification for records that were
//!    finalized but never archived -- a lost `Submitted` event or a failed
//!    transport left them stuck.
//!
//! The sweep is stateless and safe to repeat: every action it takes is
//! idempotent at the store or governed by the delivery handler's
//! idempotency guard. Any store error aborts the whole sweep, and a publish
//! failure aborts immediately rather than silently skipping records, so a
//! failed sweep is visibly distinguishable from a clean one.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use feedrelay_config::model::CaretakerConfig;
use feedrelay_core::types::NotificationEvent;
use feedrelay_core::{EventChannel, FeedrelayError, RecordStore};

/// Retention and retry windows for one sweep.
#[derive(Debug, Clone)]
pub struct CaretakerPolicy {
    /// How long archived records are kept.
    pub keep_history: Duration,
    /// Age past which a finalized, unarchived record is republished.
    pub republish_after: Duration,
    /// Grace before a draft with no comment is reaped.
    pub reap_grace: Duration,
}

impl CaretakerPolicy {
    pub fn from_config(config: &CaretakerConfig) -> Self {
        Self {
            keep_history: Duration::days(i64::from(config.keep_history_days)),
            republish_after: Duration::hours(i64::from(config.republish_after_hours)),
            reap_grace: Duration::seconds(i64::from(config.reap_grace_secs)),
        }
    }
}

/// What one sweep did. Logged and returned so operators can observe sweep
/// health directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Archived records deleted for age.
    pub expired: usize,
    /// Abandoned drafts deleted.
    pub reaped: usize,
    /// Stuck records whose notification was republished.
    pub republished: usize,
}

/// The reconciliation sweep over the capability traits.
pub struct Caretaker {
    store: Arc<dyn RecordStore>,
    channel: Arc<dyn EventChannel>,
    policy: CaretakerPolicy,
}

impl Caretaker {
    pub fn new(
        store: Arc<dyn RecordStore>,
        channel: Arc<dyn EventChannel>,
        policy: CaretakerPolicy,
    ) -> Self {
        Self {
            store,
            channel,
            policy,
        }
    }

    /// Run one sweep against the current clock.
    pub async fn sweep(&self) -> Result<SweepReport, FeedrelayError> {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep with an explicit "now", for deterministic tests.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, FeedrelayError> {
        let mut report = SweepReport::default();

        // 1. Expire archived records past the retention window.
        debug!("caretaker looking for archived feedback to expire");
        let expired = self
            .store
            .archived_before(now - self.policy.keep_history)
            .await?;
        for record in expired {
            info!(feedback_id = %record.id, archived_at = ?record.archived_at, "expiring archived feedback");
            self.store.delete_feedback(&record.id).await?;
            report.expired += 1;
        }

        // 2. Reap drafts whose comment call never came.
        debug!("caretaker looking for abandoned drafts");
        let orphans = self
            .store
            .drafts_created_before(now - self.policy.reap_grace)
            .await?;
        for record in orphans {
            info!(feedback_id = %record.id, created_at = %record.created_at, "reaping abandoned draft");
            self.store.delete_feedback(&record.id).await?;
            report.reaped += 1;
        }

        // 3. Republish notifications for stuck records. A publish failure
        // aborts the sweep; the next scheduled run picks up where this one
        // stopped, and the partial count is visible in the error path logs.
        debug!("caretaker looking for stale feedback");
        let stale = self
            .store
            .stuck_created_before(now - self.policy.republish_after)
            .await?;
        for record in stale {
            info!(feedback_id = %record.id, created_at = %record.created_at, "republishing stale feedback");
            self.channel
                .publish(&NotificationEvent::caretaker_retry(&record.id))
                .await?;
            report.republished += 1;
        }

        info!(
            expired = report.expired,
            reaped = report.reaped,
            republished = report.republished,
            "caretaker sweep complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedrelay_core::FeedbackAction;
    use feedrelay_core::types::FeedbackRecord;
    use feedrelay_test_utils::{MemoryStore, MockChannel};

    fn policy() -> CaretakerPolicy {
        CaretakerPolicy::from_config(&CaretakerConfig::default())
    }

    fn record(
        id: &str,
        created_at: DateTime<Utc>,
        message: Option<&str>,
        archived_at: Option<DateTime<Utc>>,
    ) -> FeedbackRecord {
        FeedbackRecord {
            id: id.to_string(),
            email: "ann@example.com".to_string(),
            client_ip: String::new(),
            created_at,
            subject: message.map(|_| "Bug".to_string()),
            message: message.map(str::to_string),
            name: None,
            has_uploads: false,
            archived_at,
            external_message_id: archived_at.map(|_| "mid".to_string()),
        }
    }

    async fn setup() -> (Arc<MemoryStore>, Arc<MockChannel>, Caretaker) {
        let store = Arc::new(MemoryStore::new());
        let channel = Arc::new(MockChannel::new());
        let caretaker = Caretaker::new(store.clone(), channel.clone(), policy());
        (store, channel, caretaker)
    }

    #[tokio::test]
    async fn expires_only_records_past_retention() {
        let (store, _channel, caretaker) = setup().await;
        let now = Utc::now();

        // 31 days old: expired. 29 days old: retained.
        store
            .insert_record(record(
                "old",
                now - Duration::days(31),
                Some("m"),
                Some(now - Duration::days(31)),
            ))
            .await;
        store
            .insert_record(record(
                "young",
                now - Duration::days(29),
                Some("m"),
                Some(now - Duration::days(29)),
            ))
            .await;

        let report = caretaker.sweep_at(now).await.unwrap();
        assert_eq!(report.expired, 1);
        assert!(store.record("old").await.is_none());
        assert!(store.record("young").await.is_some());
    }

    #[tokio::test]
    async fn reaps_abandoned_drafts_after_grace() {
        let (store, _channel, caretaker) = setup().await;
        let now = Utc::now();

        store
            .insert_record(record("stale-draft", now - Duration::minutes(6), None, None))
            .await;
        store
            .insert_record(record("fresh-draft", now - Duration::minutes(2), None, None))
            .await;

        let report = caretaker.sweep_at(now).await.unwrap();
        assert_eq!(report.reaped, 1);
        assert!(store.record("stale-draft").await.is_none());
        assert!(store.record("fresh-draft").await.is_some());

        // Reaped drafts do not reappear on the next sweep.
        let report = caretaker.sweep_at(now).await.unwrap();
        assert_eq!(report.reaped, 0);
    }

    #[tokio::test]
    async fn republishes_exactly_one_retry_per_stuck_record_per_sweep() {
        let (store, channel, caretaker) = setup().await;
        let now = Utc::now();

        store
            .insert_record(record("stuck", now - Duration::hours(25), Some("m"), None))
            .await;
        store
            .insert_record(record("recent", now - Duration::hours(1), Some("m"), None))
            .await;

        let report = caretaker.sweep_at(now).await.unwrap();
        assert_eq!(report.republished, 1);

        let published = channel.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].action, FeedbackAction::CaretakerRetry);
        assert_eq!(published[0].feedback_id, "stuck");

        // Still stuck on the next sweep: republished again (once per sweep
        // until archived).
        let report = caretaker.sweep_at(now).await.unwrap();
        assert_eq!(report.republished, 1);
        assert_eq!(channel.published_count().await, 2);

        // Archived records are no longer re-triggered.
        store
            .mark_archived("stuck", now, "mid")
            .await
            .unwrap();
        let report = caretaker.sweep_at(now).await.unwrap();
        assert_eq!(report.republished, 0);
    }

    #[tokio::test]
    async fn store_error_aborts_the_whole_sweep() {
        let (store, _channel, caretaker) = setup().await;
        store.set_failing(true);

        let err = caretaker.sweep().await.unwrap_err();
        assert!(matches!(err, FeedrelayError::Store { .. }));
    }

    #[tokio::test]
    async fn publish_error_aborts_instead_of_skipping() {
        let (store, channel, caretaker) = setup().await;
        let now = Utc::now();

        store
            .insert_record(record("stuck-1", now - Duration::hours(30), Some("m"), None))
            .await;
        channel.set_fail_publish(true);

        let err = caretaker.sweep_at(now).await.unwrap_err();
        assert!(matches!(err, FeedrelayError::Channel { .. }));

        // Nothing was published; the record is untouched for the next run.
        assert_eq!(channel.published_count().await, 0);
        assert!(store.record("stuck-1").await.is_some());
    }

    #[tokio::test]
    async fn clean_sweep_reports_zeroes() {
        let (_store, _channel, caretaker) = setup().await;
        let report = caretaker.sweep().await.unwrap();
        assert_eq!(report, SweepReport::default());
    }
}
