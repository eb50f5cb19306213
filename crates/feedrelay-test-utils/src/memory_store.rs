// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record store for deterministic testing.
//!
//! `MemoryStore` implements `RecordStore` over plain maps, with a switch to
//! make every operation fail so store-error paths can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use feedrelay_core::types::{FeedbackRecord, NewFeedback, NewUpload, UploadRecord};
use feedrelay_core::{AdapterType, FeedrelayError, HealthStatus, RecordStore, ServiceAdapter};

/// An in-memory `RecordStore` fake.
pub struct MemoryStore {
    records: Mutex<HashMap<String, FeedbackRecord>>,
    uploads: Mutex<Vec<UploadRecord>>,
    next_upload_id: AtomicI64,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            uploads: Mutex::new(Vec::new()),
            next_upload_id: AtomicI64::new(1),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail with a store error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing creation logic. Useful for
    /// backdated records in caretaker tests.
    pub async fn insert_record(&self, record: FeedbackRecord) {
        self.records.lock().await.insert(record.id.clone(), record);
    }

    /// Snapshot of one record, for assertions.
    pub async fn record(&self, id: &str) -> Option<FeedbackRecord> {
        self.records.lock().await.get(id).cloned()
    }

    /// Total record count.
    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }

    fn check_failing(&self) -> Result<(), FeedrelayError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(FeedrelayError::Store {
                source: "memory store failure injected".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedrelayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedrelayError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_feedback(&self, new: NewFeedback) -> Result<FeedbackRecord, FeedrelayError> {
        self.check_failing()?;
        let record = FeedbackRecord {
            id: uuid::Uuid::new_v4().to_string(),
            email: new.email,
            client_ip: new.client_ip,
            created_at: new.created_at,
            subject: new.subject,
            message: new.message,
            name: new.name,
            has_uploads: new.has_uploads,
            archived_at: None,
            external_message_id: None,
        };
        self.records
            .lock()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>, FeedrelayError> {
        self.check_failing()?;
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn count_open(&self, email: &str) -> Result<u32, FeedrelayError> {
        self.check_failing()?;
        let records = self.records.lock().await;
        Ok(records
            .values()
            .filter(|r| r.email == email && r.archived_at.is_none())
            .count() as u32)
    }

    async fn finalize_feedback(
        &self,
        id: &str,
        subject: &str,
        message: &str,
        name: Option<&str>,
    ) -> Result<bool, FeedrelayError> {
        self.check_failing()?;
        let mut records = self.records.lock().await;
        match records.get_mut(id) {
            Some(record) => {
                record.subject = Some(subject.to_string());
                record.message = Some(message.to_string());
                record.name = name.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_archived(
        &self,
        id: &str,
        archived_at: DateTime<Utc>,
        external_message_id: &str,
    ) -> Result<bool, FeedrelayError> {
        self.check_failing()?;
        let mut records = self.records.lock().await;
        match records.get_mut(id) {
            Some(record) if record.archived_at.is_none() => {
                record.archived_at = Some(archived_at);
                record.external_message_id = Some(external_message_id.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_feedback(&self, id: &str) -> Result<(), FeedrelayError> {
        self.check_failing()?;
        self.records.lock().await.remove(id);
        self.uploads.lock().await.retain(|u| u.feedback_id != id);
        Ok(())
    }

    async fn add_upload(
        &self,
        feedback_id: &str,
        upload: NewUpload,
    ) -> Result<i64, FeedrelayError> {
        self.check_failing()?;
        let id = self.next_upload_id.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().await.push(UploadRecord {
            id,
            feedback_id: feedback_id.to_string(),
            filename: upload.filename,
            content_length: upload.data.len() as i64,
            data: upload.data,
            ignored: upload.ignored,
        });
        Ok(id)
    }

    async fn count_uploads(&self, feedback_id: &str) -> Result<u32, FeedrelayError> {
        self.check_failing()?;
        let uploads = self.uploads.lock().await;
        Ok(uploads
            .iter()
            .filter(|u| u.feedback_id == feedback_id && !u.ignored)
            .count() as u32)
    }

    async fn list_uploads(&self, feedback_id: &str) -> Result<Vec<UploadRecord>, FeedrelayError> {
        self.check_failing()?;
        let uploads = self.uploads.lock().await;
        Ok(uploads
            .iter()
            .filter(|u| u.feedback_id == feedback_id)
            .cloned()
            .collect())
    }

    async fn archived_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        self.check_failing()?;
        Ok(self
            .select(|r| matches!(r.archived_at, Some(at) if at <= cutoff))
            .await)
    }

    async fn drafts_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        self.check_failing()?;
        Ok(self
            .select(|r| r.message.is_none() && r.created_at <= cutoff)
            .await)
    }

    async fn stuck_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        self.check_failing()?;
        Ok(self
            .select(|r| r.archived_at.is_none() && r.message.is_some() && r.created_at <= cutoff)
            .await)
    }

    async fn undelivered(&self) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
        self.check_failing()?;
        Ok(self
            .select(|r| r.archived_at.is_none() && r.message.is_some())
            .await)
    }
}

impl MemoryStore {
    async fn select(&self, predicate: impl Fn(&FeedbackRecord) -> bool) -> Vec<FeedbackRecord> {
        let records = self.records.lock().await;
        let mut selected: Vec<FeedbackRecord> =
            records.values().filter(|r| predicate(r)).cloned().collect();
        selected.sort_by_key(|r| r.created_at);
        selected
    }
}
