// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback record CRUD and the conditional lifecycle transitions.

use chrono::{DateTime, Utc};
use feedrelay_core::FeedrelayError;
use rusqlite::params;

use crate::database::{Database, fmt_ts, parse_ts};
use crate::models::{FeedbackRecord, NewFeedback};

/// Map one `feedback` row (selected with [`COLUMNS`]) into a record.
fn row_to_record(row: &rusqlite::Row<'_>) -> Result<FeedbackRecord, rusqlite::Error> {
    let created_at: String = row.get(3)?;
    let archived_at: Option<String> = row.get(8)?;
    Ok(FeedbackRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        client_ip: row.get(2)?,
        created_at: parse_ts(3, &created_at)?,
        subject: row.get(4)?,
        message: row.get(5)?,
        name: row.get(6)?,
        has_uploads: row.get(7)?,
        archived_at: archived_at.as_deref().map(|s| parse_ts(8, s)).transpose()?,
        external_message_id: row.get(9)?,
    })
}

const COLUMNS: &str = "id, email, client_ip, created_at, subject, message, name, \
                       has_uploads, archived_at, external_message_id";

/// Create a feedback record with a generated id and return it.
pub async fn create(db: &Database, new: NewFeedback) -> Result<FeedbackRecord, FeedrelayError> {
    let id = uuid::Uuid::new_v4().to_string();
    let record = FeedbackRecord {
        id: id.clone(),
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

    let insert = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO feedback (id, email, client_ip, created_at, subject, message, name, has_uploads)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    insert.id,
                    insert.email,
                    insert.client_ip,
                    fmt_ts(insert.created_at),
                    insert.subject,
                    insert.message,
                    insert.name,
                    insert.has_uploads,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(record)
}

/// Get a feedback record by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<FeedbackRecord>, FeedrelayError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM feedback WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_record);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count open (unarchived) records for an email address.
pub async fn count_open(db: &Database, email: &str) -> Result<u32, FeedrelayError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM feedback WHERE email = ?1 AND archived_at IS NULL",
                params![email],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fill subject/message/name in place: the transition out of draft state.
///
/// Returns `false` when `id` references no record.
pub async fn finalize(
    db: &Database,
    id: &str,
    subject: &str,
    message: &str,
    name: Option<&str>,
) -> Result<bool, FeedrelayError> {
    let id = id.to_string();
    let subject = subject.to_string();
    let message = message.to_string();
    let name = name.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE feedback SET subject = ?2, message = ?3, name = ?4 WHERE id = ?1",
                params![id, subject, message, name],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stamp `archived_at` and `external_message_id` together, conditional on
/// the record not being archived yet.
///
/// Returns `true` iff this call performed the stamp; `false` means the
/// record is already archived (or does not exist) and must not be re-sent.
pub async fn mark_archived(
    db: &Database,
    id: &str,
    archived_at: DateTime<Utc>,
    external_message_id: &str,
) -> Result<bool, FeedrelayError> {
    let id = id.to_string();
    let external_message_id = external_message_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE feedback SET archived_at = ?2, external_message_id = ?3
                 WHERE id = ?1 AND archived_at IS NULL",
                params![id, fmt_ts(archived_at), external_message_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a record; upload children go with it via cascade.
pub async fn delete(db: &Database, id: &str) -> Result<(), FeedrelayError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM feedback WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Archived records whose `archived_at` is at or before `cutoff`.
pub async fn archived_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
    select_records(
        db,
        "archived_at IS NOT NULL AND archived_at <= ?1",
        Some(cutoff),
    )
    .await
}

/// Draft records (never finalized) created at or before `cutoff`.
pub async fn drafts_created_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
    select_records(db, "message IS NULL AND created_at <= ?1", Some(cutoff)).await
}

/// Finalized but unarchived records created at or before `cutoff`.
pub async fn stuck_created_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
    select_records(
        db,
        "archived_at IS NULL AND message IS NOT NULL AND created_at <= ?1",
        Some(cutoff),
    )
    .await
}

/// All finalized but unarchived records, regardless of age.
pub async fn undelivered(db: &Database) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
    select_records(db, "archived_at IS NULL AND message IS NOT NULL", None).await
}

async fn select_records(
    db: &Database,
    condition: &str,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<FeedbackRecord>, FeedrelayError> {
    let sql = format!("SELECT {COLUMNS} FROM feedback WHERE {condition} ORDER BY created_at ASC");
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut records = Vec::new();
            match cutoff {
                Some(cutoff) => {
                    let rows = stmt.query_map(params![fmt_ts(cutoff)], row_to_record)?;
                    for row in rows {
                        records.push(row?);
                    }
                }
                None => {
                    let rows = stmt.query_map([], row_to_record)?;
                    for row in rows {
                        records.push(row?);
                    }
                }
            }
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (db, _dir) = setup_db().await;

        let created = create(
            &db,
            NewFeedback::draft("a@b.com", "203.0.113.9", Utc::now()),
        )
        .await
        .unwrap();
        assert!(!created.id.is_empty());
        assert!(created.is_draft());

        let fetched = get(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let missing = get(&db, "no-such-id").await.unwrap();
        assert!(missing.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn count_open_ignores_archived_and_other_emails() {
        let (db, _dir) = setup_db().await;
        let now = Utc::now();

        let a = create(&db, NewFeedback::draft("a@b.com", "", now)).await.unwrap();
        create(&db, NewFeedback::draft("a@b.com", "", now)).await.unwrap();
        create(&db, NewFeedback::draft("other@b.com", "", now)).await.unwrap();

        assert_eq!(count_open(&db, "a@b.com").await.unwrap(), 2);

        mark_archived(&db, &a.id, now, "msg-1").await.unwrap();
        assert_eq!(count_open(&db, "a@b.com").await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn finalize_fills_fields_and_reports_missing_records() {
        let (db, _dir) = setup_db().await;

        let record = create(&db, NewFeedback::draft("a@b.com", "", Utc::now()))
            .await
            .unwrap();

        let found = finalize(&db, &record.id, "Bug", "Crashes", Some("Ann"))
            .await
            .unwrap();
        assert!(found);

        let updated = get(&db, &record.id).await.unwrap().unwrap();
        assert_eq!(updated.subject.as_deref(), Some("Bug"));
        assert_eq!(updated.message.as_deref(), Some("Crashes"));
        assert_eq!(updated.name.as_deref(), Some("Ann"));
        assert!(!updated.is_draft());

        let found = finalize(&db, "no-such-id", "s", "m", None).await.unwrap();
        assert!(!found);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_archived_is_conditional_and_one_shot() {
        let (db, _dir) = setup_db().await;
        let now = Utc::now();

        let record = create(
            &db,
            NewFeedback::finalized("a@b.com", "", now, "Bug", "Crashes", None),
        )
        .await
        .unwrap();

        let stamped = mark_archived(&db, &record.id, now, "msg-1").await.unwrap();
        assert!(stamped);

        // A second stamp loses: the first write wins and is never reversed.
        let stamped = mark_archived(&db, &record.id, now + Duration::hours(1), "msg-2")
            .await
            .unwrap();
        assert!(!stamped);

        let fetched = get(&db, &record.id).await.unwrap().unwrap();
        assert_eq!(fetched.external_message_id.as_deref(), Some("msg-1"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn caretaker_scans_select_the_right_records() {
        let (db, _dir) = setup_db().await;
        let now = Utc::now();
        let old = now - Duration::days(40);
        let recent = now - Duration::hours(1);

        // Old archived record: expired.
        let expired = create(
            &db,
            NewFeedback::finalized("a@b.com", "", old, "s", "m", None),
        )
        .await
        .unwrap();
        mark_archived(&db, &expired.id, old, "m-old").await.unwrap();

        // Recently archived record: kept.
        let kept = create(
            &db,
            NewFeedback::finalized("a@b.com", "", recent, "s", "m", None),
        )
        .await
        .unwrap();
        mark_archived(&db, &kept.id, recent, "m-new").await.unwrap();

        // Old draft: orphan.
        let orphan = create(&db, NewFeedback::draft("a@b.com", "", old)).await.unwrap();

        // Old finalized, never archived: stuck.
        let stuck = create(
            &db,
            NewFeedback::finalized("a@b.com", "", old, "s", "m", None),
        )
        .await
        .unwrap();

        let cutoff = now - Duration::days(30);
        let expired_found = archived_before(&db, cutoff).await.unwrap();
        assert_eq!(expired_found.len(), 1);
        assert_eq!(expired_found[0].id, expired.id);

        let orphans = drafts_created_before(&db, now - Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, orphan.id);

        let stuck_found = stuck_created_before(&db, now - Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(stuck_found.len(), 1);
        assert_eq!(stuck_found[0].id, stuck.id);

        // undelivered sees the stuck record regardless of age.
        let undelivered_found = undelivered(&db).await.unwrap();
        assert_eq!(undelivered_found.len(), 1);
        assert_eq!(undelivered_found[0].id, stuck.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let (db, _dir) = setup_db().await;

        let record = create(&db, NewFeedback::draft("a@b.com", "", Utc::now()))
            .await
            .unwrap();
        delete(&db, &record.id).await.unwrap();
        assert!(get(&db, &record.id).await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
