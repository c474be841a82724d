// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification subject and body formatting.
//!
//! Pure functions over a [`FeedbackRecord`], kept separate from the SMTP
//! transport so the content can be tested without a mail server.

use carelink_core::types::{FeedbackCategory, FeedbackRecord, Locale, MediaAttachment};
use chrono::DateTime;

/// Human-readable creation time pattern used in the notification body.
const TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Localized display name of a category.
pub fn category_display_name(category: FeedbackCategory, locale: Locale) -> &'static str {
    match (locale, category) {
        (Locale::En, FeedbackCategory::Complaint) => "Complaint",
        (Locale::En, FeedbackCategory::Review) => "Review",
        (Locale::Ru, FeedbackCategory::Complaint) => "Жалоба",
        (Locale::Ru, FeedbackCategory::Review) => "Отзыв",
    }
}

/// Subject line keyed by the record's category.
pub fn subject(record: &FeedbackRecord, locale: Locale) -> String {
    let category = category_display_name(record.category, locale);
    match locale {
        Locale::En => format!("New feedback: {category}"),
        Locale::Ru => format!("Новое обращение: {category}"),
    }
}

/// Plain-text body with submitter identity, category, creation time,
/// message text, and a one-line-per-attachment summary.
pub fn body(record: &FeedbackRecord, locale: Locale) -> String {
    let category = category_display_name(record.category, locale);
    let created_at = format_created_at(&record.created_at);
    let name = record.submitter.display_name();
    let username = record.submitter.username.as_deref().unwrap_or("-");

    let mut text = match locale {
        Locale::En => format!(
            "New feedback received\n\
             \n\
             Submitter:\n\
             - Name: {name}\n\
             - Username: @{username}\n\
             - ID: {user_id}\n\
             \n\
             Category: {category}\n\
             Date: {created_at}\n\
             \n\
             Message:\n\
             {message}\n",
            user_id = record.submitter.user_id,
            message = record.message,
        ),
        Locale::Ru => format!(
            "Новое обращение в системе обратной связи\n\
             \n\
             Отправитель:\n\
             - Имя: {name}\n\
             - Username: @{username}\n\
             - ID: {user_id}\n\
             \n\
             Тип обращения: {category}\n\
             Дата: {created_at}\n\
             \n\
             Сообщение:\n\
             {message}\n",
            user_id = record.submitter.user_id,
            message = record.message,
        ),
    };

    if !record.attachments.is_empty() {
        text.push('\n');
        text.push_str(match locale {
            Locale::En => "Attachments:\n",
            Locale::Ru => "Вложения:\n",
        });
        for attachment in &record.attachments {
            text.push_str(&attachment_line(attachment));
            text.push('\n');
        }
    }

    text.push_str(match locale {
        Locale::En => "\n---\nAutomated notification from the hospital feedback system.",
        Locale::Ru => "\n---\nЭто автоматическое уведомление от системы обратной связи больницы.",
    });

    text
}

/// One summary line per attachment: kind, optional name, optional size.
fn attachment_line(attachment: &MediaAttachment) -> String {
    let mut line = format!("- {}", attachment.kind);
    if let Some(ref name) = attachment.file_name {
        line.push(' ');
        line.push_str(name);
    }
    if let Some(size) = attachment.file_size {
        line.push_str(&format!(" ({size} bytes)"));
    }
    line
}

/// Formats the stored RFC 3339 timestamp in the human-readable pattern,
/// keeping the record's own offset. Falls back to the raw string when the
/// stored value does not parse.
fn format_created_at(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::types::{FeedbackStatus, MediaKind, Submitter};

    fn make_record(category: FeedbackCategory) -> FeedbackRecord {
        FeedbackRecord {
            id: 1,
            submitter: Submitter {
                user_id: 555,
                first_name: "Aru".into(),
                last_name: "Seitkali".into(),
                username: Some("aru".into()),
            },
            message: "Long wait times".into(),
            category,
            status: FeedbackStatus::New,
            created_at: "2026-03-14T09:30:00+05:00".into(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn subject_is_keyed_by_category() {
        let complaint = make_record(FeedbackCategory::Complaint);
        let review = make_record(FeedbackCategory::Review);

        assert_eq!(subject(&complaint, Locale::En), "New feedback: Complaint");
        assert_eq!(subject(&review, Locale::En), "New feedback: Review");
        assert_eq!(subject(&complaint, Locale::Ru), "Новое обращение: Жалоба");
    }

    #[test]
    fn body_contains_identity_and_message() {
        let record = make_record(FeedbackCategory::Complaint);
        let text = body(&record, Locale::En);

        assert!(text.contains("Aru Seitkali"));
        assert!(text.contains("@aru"));
        assert!(text.contains("ID: 555"));
        assert!(text.contains("Long wait times"));
        assert!(text.contains("Category: Complaint"));
    }

    #[test]
    fn body_formats_time_in_human_pattern() {
        let record = make_record(FeedbackCategory::Review);
        let text = body(&record, Locale::En);
        assert!(text.contains("14.03.2026 09:30:00"), "got: {text}");
    }

    #[test]
    fn body_falls_back_to_raw_timestamp() {
        let mut record = make_record(FeedbackCategory::Review);
        record.created_at = "not-a-date".into();
        let text = body(&record, Locale::En);
        assert!(text.contains("not-a-date"));
    }

    #[test]
    fn body_lists_attachments_one_per_line() {
        let mut record = make_record(FeedbackCategory::Complaint);
        record.attachments = vec![
            MediaAttachment {
                id: 1,
                feedback_id: 1,
                kind: MediaKind::Photo,
                file_id: "f1".into(),
                file_name: None,
                file_size: Some(2048),
                mime_type: None,
            },
            MediaAttachment {
                id: 2,
                feedback_id: 1,
                kind: MediaKind::Document,
                file_id: "f2".into(),
                file_name: Some("scan.pdf".into()),
                file_size: None,
                mime_type: Some("application/pdf".into()),
            },
        ];

        let text = body(&record, Locale::En);
        assert!(text.contains("- photo (2048 bytes)"));
        assert!(text.contains("- document scan.pdf"));
    }

    #[test]
    fn body_without_attachments_has_no_attachment_section() {
        let record = make_record(FeedbackCategory::Review);
        let text = body(&record, Locale::En);
        assert!(!text.contains("Attachments:"));
    }

    #[test]
    fn missing_username_renders_placeholder() {
        let mut record = make_record(FeedbackCategory::Complaint);
        record.submitter.username = None;
        let text = body(&record, Locale::En);
        assert!(text.contains("@-"));
    }
}
