// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RecordStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use feedrelay_config::model::StorageConfig;
use feedrelay_core::types::{FeedbackRecord, NewFeedback, NewUpload, UploadRecord};
use feedrelay_core::{AdapterType, FeedrelayError, HealthStatus, RecordStore, ServiceAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed record store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`SqliteRecordStore::initialize`].
pub struct SqliteRecordStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteRecordStore {
    /// Create a new SqliteRecordStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteRecordStore::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database, apply PRAGMAs, and run migrations.
    pub async fn initialize(&self) -> Result<(), FeedrelayError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| FeedrelayError::Store {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite record store initialized");
        Ok(())
    }

    /// Returns a clone of the underlying Database handle, for adapters that
    /// share the same file (the notification queue).
    pub fn database(&self) -> Result<Database, FeedrelayError> {
        self.db().cloned()
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, FeedrelayError> {
        self.db.get().ok_or_else(|| FeedrelayError::Store {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ServiceAdapter for SqliteRecordStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedrelayError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedrelayError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create_feedback(&self, new: NewFeedback) -> Result<FeedbackRecord, FeedrelayError> {
        queries::feedback::create(self.db()?, new).await
    }

    async fn get_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>, FeedrelayError> {
        queries::feedback::get(self.db()?, id).await
    }

    async fn count_open(&self, email: &str) -> Result<u32, FeedrelayError> {
        queries::feedback::count_open(self.db()?, email).await
    }

    async fn finalize_feedback(
        &self,
        id: &str,
        subject: &str,
        message: &str,
        name: Option<&str>,
    ) -> Result<bool, FeedrelayError> {
        queries::feedback::finalize(self.db()?, id, subject, message, name).await
    }

    async fn mark_archived(
        &self,
        id: &str,
        archived_at: DateTime<Utc>,
        external_message_id: &str,
    ) -> Result<bool, FeedrelayError> {
        queries::feedback::mark_archived(self.db()?, id, archived_at, external_message_id).await
    }

    async fn delete_feedback(&self, id: &str) -> Result<(), FeedrelayError> {
        queries::feedback::delete(self.db()?, id).await
    }

    async fn add_upload(
        &self,
        feedback_id: &str,
        upload: NewUpload,
    ) -> Result<i64, FeedrelayError> {
        queries::uploads::add(self.db()?, feedback_id, upload).await
    }

    async fn count_uploads(&self, feedback_id: &str) -> Result<u32, FeedrelayError> {
        queries::uploads::count_active(self.db()?, feedback_id).await
    }

    async fn list_uploads(&self, feedback_id: &str) -> Result<Vec<UploadRecord>, FeedrelayError> {
        queries::uploads::list(self.db()?, feedback_id).await
    }

    async fn archived_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        queries::feedback::archived_before(self.db()?, cutoff).await
    }

    async fn drafts_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        queries::feedback::drafts_created_before(self.db()?, cutoff).await
    }

    async fn stuck_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        queries::feedback::stuck_created_before(self.db()?, cutoff).await
    }

    async fn undelivered(&self) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        queries::feedback::undelivered(self.db()?).await
    }
}
