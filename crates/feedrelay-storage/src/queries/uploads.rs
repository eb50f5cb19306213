// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upload child operations.

use feedrelay_core::FeedrelayError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{NewUpload, UploadRecord};

/// Append one upload child to a feedback record. Returns the child id.
///
/// `content_length` is derived from the stored payload, so a placeholder's
/// length reflects the placeholder text, not the original file.
pub async fn add(
    db: &Database,
    feedback_id: &str,
    upload: NewUpload,
) -> Result<i64, FeedrelayError> {
    let feedback_id = feedback_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO uploads (feedback_id, filename, data, content_length, ignored)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    feedback_id,
                    upload.filename,
                    upload.data,
                    upload.data.len() as i64,
                    upload.ignored,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count non-placeholder upload children of a record.
pub async fn count_active(db: &Database, feedback_id: &str) -> Result<u32, FeedrelayError> {
    let feedback_id = feedback_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM uploads WHERE feedback_id = ?1 AND ignored = 0",
                params![feedback_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all upload children of a record in insertion order.
pub async fn list(db: &Database, feedback_id: &str) -> Result<Vec<UploadRecord>, FeedrelayError> {
    let feedback_id = feedback_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, feedback_id, filename, data, content_length, ignored
                 FROM uploads WHERE feedback_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![feedback_id], |row| {
                Ok(UploadRecord {
                    id: row.get(0)?,
                    feedback_id: row.get(1)?,
                    filename: row.get(2)?,
                    data: row.get(3)?,
                    content_length: row.get(4)?,
                    ignored: row.get(5)?,
                })
            })?;
            let mut uploads = Vec::new();
            for row in rows {
                uploads.push(row?);
            }
            Ok(uploads)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
