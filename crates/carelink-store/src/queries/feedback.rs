// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback CRUD operations.
//!
//! `save_feedback` writes the parent row and all attachment rows inside one
//! transaction: a partial insert is never observable.

use std::collections::BTreeMap;
use std::str::FromStr;

use carelink_core::CarelinkError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{
    FeedbackCategory, FeedbackRecord, FeedbackStatus, MediaAttachment, MediaKind, NewFeedback,
    Submitter,
};

/// Insert a feedback record and its attachments atomically.
///
/// Returns the stored record with its store-assigned ID and status `new`.
pub async fn save_feedback(
    db: &Database,
    feedback: &NewFeedback,
) -> Result<FeedbackRecord, CarelinkError> {
    let feedback = feedback.clone();
    db.connection()
        .call(move |conn| -> Result<FeedbackRecord, rusqlite::Error> {
            let tx = conn.transaction()?;

            let created_at = feedback.created_at.to_rfc3339();
            tx.execute(
                "INSERT INTO feedback (user_id, username, first_name, last_name, message, category, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    feedback.submitter.user_id,
                    feedback.submitter.username,
                    feedback.submitter.first_name,
                    feedback.submitter.last_name,
                    feedback.message,
                    feedback.category.to_string(),
                    FeedbackStatus::New.to_string(),
                    created_at,
                ],
            )?;
            let feedback_id = tx.last_insert_rowid();

            let mut attachments = Vec::with_capacity(feedback.attachments.len());
            for media in &feedback.attachments {
                tx.execute(
                    "INSERT INTO media_files (feedback_id, kind, file_id, file_name, file_size, mime_type)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        feedback_id,
                        media.kind.to_string(),
                        media.file_id,
                        media.file_name,
                        media.file_size,
                        media.mime_type,
                    ],
                )?;
                attachments.push(MediaAttachment {
                    id: tx.last_insert_rowid(),
                    feedback_id,
                    kind: media.kind,
                    file_id: media.file_id.clone(),
                    file_name: media.file_name.clone(),
                    file_size: media.file_size,
                    mime_type: media.mime_type.clone(),
                });
            }

            tx.commit()?;

            Ok(FeedbackRecord {
                id: feedback_id,
                submitter: feedback.submitter.clone(),
                message: feedback.message.clone(),
                category: feedback.category,
                status: FeedbackStatus::New,
                created_at,
                attachments,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All records with status `new`, ascending by creation time, attachments
/// eagerly loaded.
pub async fn list_new(db: &Database) -> Result<Vec<FeedbackRecord>, CarelinkError> {
    db.connection()
        .call(|conn| -> Result<Vec<FeedbackRecord>, rusqlite::Error> {
            let mut records = {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, username, first_name, last_name, message, category, status, created_at
                     FROM feedback WHERE status = 'new'
                     ORDER BY created_at ASC",
                )?;
                let rows = stmt.query_map([], map_feedback_row)?;
                let mut records = Vec::new();
                for row in rows {
                    records.push(row?);
                }
                records
            };

            for record in &mut records {
                record.attachments = load_attachments(conn, record.id)?;
            }

            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Unconditionally overwrite a record's status. Any status can follow any
/// status; there is no optimistic concurrency check.
pub async fn update_status(
    db: &Database,
    id: i64,
    status: FeedbackStatus,
) -> Result<(), CarelinkError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE feedback SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Grouped record counts per category. Absent category means zero.
pub async fn counts_by_category(
    db: &Database,
) -> Result<BTreeMap<FeedbackCategory, u64>, CarelinkError> {
    db.connection()
        .call(|conn| -> Result<BTreeMap<FeedbackCategory, u64>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT category, COUNT(*) FROM feedback GROUP BY category")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
            })?;

            let mut counts = BTreeMap::new();
            for row in rows {
                let (category, count) = row?;
                // The CHECK constraint keeps unknown categories out of the
                // table; skip defensively on schema drift.
                if let Ok(category) = FeedbackCategory::from_str(&category) {
                    counts.insert(category, count);
                }
            }
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a record. Its attachments are removed by `ON DELETE CASCADE`.
pub async fn delete_feedback(db: &Database, id: i64) -> Result<(), CarelinkError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute("DELETE FROM feedback WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn map_feedback_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    let category: String = row.get(6)?;
    let status: String = row.get(7)?;
    Ok(FeedbackRecord {
        id: row.get(0)?,
        submitter: Submitter {
            user_id: row.get(1)?,
            username: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
        },
        message: row.get(5)?,
        category: FeedbackCategory::from_str(&category).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        status: FeedbackStatus::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: row.get(8)?,
        attachments: Vec::new(),
    })
}

fn load_attachments(
    conn: &rusqlite::Connection,
    feedback_id: i64,
) -> rusqlite::Result<Vec<MediaAttachment>> {
    let mut stmt = conn.prepare(
        "SELECT id, feedback_id, kind, file_id, file_name, file_size, mime_type
         FROM media_files WHERE feedback_id = ?1
         ORDER BY id",
    )?;
    let rows = stmt.query_map(params![feedback_id], |row| {
        let kind: String = row.get(2)?;
        Ok(MediaAttachment {
            id: row.get(0)?,
            feedback_id: row.get(1)?,
            kind: MediaKind::from_str(&kind).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            file_id: row.get(3)?,
            file_name: row.get(4)?,
            file_size: row.get(5)?,
            mime_type: row.get(6)?,
        })
    })?;

    let mut attachments = Vec::new();
    for row in rows {
        attachments.push(row?);
    }
    Ok(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMediaAttachment;
    use chrono::{FixedOffset, TimeZone};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_feedback(category: FeedbackCategory, message: &str, minute: u32) -> NewFeedback {
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        NewFeedback {
            submitter: Submitter {
                user_id: 100,
                first_name: "Aru".into(),
                last_name: "Seitkali".into(),
                username: Some("aru".into()),
            },
            message: message.to_string(),
            category,
            created_at: tz.with_ymd_and_hms(2026, 3, 14, 9, minute, 0).unwrap(),
            attachments: Vec::new(),
        }
    }

    fn make_attachment(file_id: &str) -> NewMediaAttachment {
        NewMediaAttachment {
            kind: MediaKind::Photo,
            file_id: file_id.to_string(),
            file_name: None,
            file_size: Some(2048),
            mime_type: None,
        }
    }

    #[tokio::test]
    async fn save_assigns_id_and_new_status() {
        let (db, _dir) = setup_db().await;

        let record = save_feedback(&db, &make_feedback(FeedbackCategory::Complaint, "slow", 0))
            .await
            .unwrap();
        assert!(record.id > 0);
        assert_eq!(record.status, FeedbackStatus::New);
        assert_eq!(record.category, FeedbackCategory::Complaint);
        assert!(record.attachments.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn save_with_attachments_is_atomic() {
        let (db, _dir) = setup_db().await;

        let mut feedback = make_feedback(FeedbackCategory::Review, "great care", 0);
        feedback.attachments = vec![make_attachment("file-1"), make_attachment("file-2")];

        let record = save_feedback(&db, &feedback).await.unwrap();
        assert_eq!(record.attachments.len(), 2);
        assert!(record.attachments.iter().all(|a| a.feedback_id == record.id));
        assert_ne!(record.attachments[0].id, record.attachments[1].id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_attachment_write_rolls_back_parent() {
        let (db, _dir) = setup_db().await;

        // Sabotage the attachment table so the second write in the
        // transaction fails.
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("DROP TABLE media_files;")?;
                Ok(())
            })
            .await
            .unwrap();

        let mut feedback = make_feedback(FeedbackCategory::Complaint, "lost luggage", 0);
        feedback.attachments = vec![make_attachment("file-1")];

        let result = save_feedback(&db, &feedback).await;
        assert!(result.is_err());

        // The parent row must not have survived the failed transaction.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                Ok(conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(count, 0, "no partial write may be observable");
    }

    #[tokio::test]
    async fn list_new_orders_by_creation_time() {
        let (db, _dir) = setup_db().await;

        save_feedback(&db, &make_feedback(FeedbackCategory::Review, "second", 10))
            .await
            .unwrap();
        save_feedback(&db, &make_feedback(FeedbackCategory::Complaint, "first", 5))
            .await
            .unwrap();

        let records = list_new(&db).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].message, "second");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_new_loads_attachments_and_skips_sent() {
        let (db, _dir) = setup_db().await;

        let mut with_media = make_feedback(FeedbackCategory::Complaint, "photo proof", 0);
        with_media.attachments = vec![make_attachment("file-9")];
        let kept = save_feedback(&db, &with_media).await.unwrap();

        let delivered = save_feedback(&db, &make_feedback(FeedbackCategory::Review, "done", 1))
            .await
            .unwrap();
        update_status(&db, delivered.id, FeedbackStatus::Sent)
            .await
            .unwrap();

        let records = list_new(&db).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, kept.id);
        assert_eq!(records[0].attachments.len(), 1);
        assert_eq!(records[0].attachments[0].file_id, "file-9");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_status_overwrites_unconditionally() {
        let (db, _dir) = setup_db().await;

        let record = save_feedback(&db, &make_feedback(FeedbackCategory::Review, "x", 0))
            .await
            .unwrap();

        // Any status can follow any status.
        update_status(&db, record.id, FeedbackStatus::Sent).await.unwrap();
        update_status(&db, record.id, FeedbackStatus::New).await.unwrap();
        update_status(&db, record.id, FeedbackStatus::Processed)
            .await
            .unwrap();

        let status: String = db
            .connection()
            .call(move |conn| -> Result<String, rusqlite::Error> {
                Ok(conn.query_row(
                    "SELECT status FROM feedback WHERE id = ?1",
                    params![record.id],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(status, "processed");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn counts_omit_absent_categories() {
        let (db, _dir) = setup_db().await;

        for i in 0..3 {
            save_feedback(&db, &make_feedback(FeedbackCategory::Review, "nice", i))
                .await
                .unwrap();
        }

        let counts = counts_by_category(&db).await.unwrap();
        assert_eq!(counts.get(&FeedbackCategory::Review), Some(&3));
        assert!(
            !counts.contains_key(&FeedbackCategory::Complaint),
            "absent category must be absent, not zero"
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_cascades_to_attachments() {
        let (db, _dir) = setup_db().await;

        let mut feedback = make_feedback(FeedbackCategory::Complaint, "with media", 0);
        feedback.attachments = vec![make_attachment("file-1"), make_attachment("file-2")];
        let record = save_feedback(&db, &feedback).await.unwrap();

        delete_feedback(&db, record.id).await.unwrap();

        let orphans: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                Ok(conn.query_row("SELECT COUNT(*) FROM media_files", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(orphans, 0, "cascade delete must remove attachments");

        db.close().await.unwrap();
    }
}
