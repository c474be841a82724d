// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound update mapping: Telegram messages and callback queries are
//! converted into transport-agnostic [`ChatEvent`]s.
//!
//! Media messages keep only the transport file reference and its metadata;
//! the bytes themselves are never fetched or stored.

use carelink_core::types::{
    ButtonAction, ChatEvent, Command, EventPayload, MediaKind, NewMediaAttachment, Submitter,
};
use teloxide::prelude::*;
use teloxide::types::{MaybeInaccessibleMessage, User};
use tracing::debug;

/// Copies the sender identity verbatim from a Telegram user.
pub fn extract_submitter(user: &User) -> Submitter {
    Submitter {
        user_id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone().unwrap_or_default(),
        username: user.username.clone(),
    }
}

/// Converts a Telegram message into a [`ChatEvent`].
///
/// Commands take precedence over free text. Photo, video, document, and
/// audio messages become [`EventPayload::Media`] with their caption.
/// Returns `None` for messages without a sender and for unsupported
/// message types (stickers, locations, etc.).
pub fn message_to_event(msg: &Message) -> Option<ChatEvent> {
    let sender = extract_submitter(msg.from.as_ref()?);
    let chat_id = msg.chat.id.0;

    if let Some(text) = msg.text() {
        let payload = match Command::parse(text) {
            Some(command) => EventPayload::Command(command),
            None => EventPayload::Text(text.to_string()),
        };
        return Some(ChatEvent {
            sender,
            chat_id,
            payload,
        });
    }

    if let Some(attachment) = extract_attachment(msg) {
        let caption = msg.caption().unwrap_or_default().to_string();
        return Some(ChatEvent {
            sender,
            chat_id,
            payload: EventPayload::Media {
                caption,
                attachment,
            },
        });
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    None
}

/// Extracts the media file reference from a message, if it carries one.
///
/// For photos Telegram provides multiple sizes; the last one is the
/// largest and is the one referenced.
pub fn extract_attachment(msg: &Message) -> Option<NewMediaAttachment> {
    if let Some(photos) = msg.photo() {
        let largest = photos.last()?;
        return Some(NewMediaAttachment {
            kind: MediaKind::Photo,
            file_id: largest.file.id.to_string(),
            file_name: None,
            file_size: Some(i64::from(largest.file.size)),
            mime_type: None,
        });
    }

    if let Some(video) = msg.video() {
        return Some(NewMediaAttachment {
            kind: MediaKind::Video,
            file_id: video.file.id.to_string(),
            file_name: video.file_name.clone(),
            file_size: Some(i64::from(video.file.size)),
            mime_type: video.mime_type.as_ref().map(|m| m.to_string()),
        });
    }

    if let Some(doc) = msg.document() {
        return Some(NewMediaAttachment {
            kind: MediaKind::Document,
            file_id: doc.file.id.to_string(),
            file_name: doc.file_name.clone(),
            file_size: Some(i64::from(doc.file.size)),
            mime_type: doc.mime_type.as_ref().map(|m| m.to_string()),
        });
    }

    if let Some(audio) = msg.audio() {
        return Some(NewMediaAttachment {
            kind: MediaKind::Audio,
            file_id: audio.file.id.to_string(),
            file_name: audio.file_name.clone(),
            file_size: Some(i64::from(audio.file.size)),
            mime_type: audio.mime_type.as_ref().map(|m| m.to_string()),
        });
    }

    None
}

/// Converts a callback query (inline button press) into a [`ChatEvent`].
///
/// Returns `None` when the payload is not one of the known button actions
/// or the originating chat cannot be determined.
pub fn callback_to_event(query: &CallbackQuery) -> Option<ChatEvent> {
    let action = ButtonAction::from_callback_data(query.data.as_deref()?)?;

    let chat_id = match query.message.as_ref()? {
        MaybeInaccessibleMessage::Regular(msg) => msg.chat.id.0,
        MaybeInaccessibleMessage::Inaccessible(msg) => msg.chat.id.0,
    };

    Some(ChatEvent {
        sender: extract_submitter(&query.from),
        chat_id,
        payload: EventPayload::Button(action),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a mock private chat message from JSON, matching Telegram Bot
    /// API structure.
    fn make_text_message(user_id: u64, username: Option<&str>, text: &str) -> Message {
        let from = if let Some(uname) = username {
            serde_json::json!({
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
                "last_name": "User",
                "username": uname,
            })
        } else {
            serde_json::json!({
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            })
        };

        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": from,
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    /// Build a mock photo message with a caption.
    fn make_photo_message(user_id: u64, caption: Option<&str>) -> Message {
        let mut json = serde_json::json!({
            "message_id": 2,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "photo": [
                {
                    "file_id": "small-file",
                    "file_unique_id": "u1",
                    "file_size": 100,
                    "width": 90,
                    "height": 90,
                },
                {
                    "file_id": "large-file",
                    "file_unique_id": "u2",
                    "file_size": 9000,
                    "width": 800,
                    "height": 800,
                },
            ],
        });
        if let Some(c) = caption {
            json["caption"] = serde_json::json!(c);
        }

        serde_json::from_value(json).expect("failed to deserialize mock photo message")
    }

    /// Build a mock document message.
    fn make_document_message(user_id: u64) -> Message {
        let json = serde_json::json!({
            "message_id": 3,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "document": {
                "file_id": "doc-file",
                "file_unique_id": "u3",
                "file_size": 4096,
                "file_name": "scan.pdf",
                "mime_type": "application/pdf",
            },
        });

        serde_json::from_value(json).expect("failed to deserialize mock document message")
    }

    /// Build a mock callback query carrying the given data payload.
    fn make_callback_query(user_id: u64, data: &str) -> CallbackQuery {
        let json = serde_json::json!({
            "id": "cb-1",
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "chat_instance": "ci-1",
            "data": data,
            "message": {
                "message_id": 10,
                "date": 1700000000i64,
                "chat": {
                    "id": user_id as i64,
                    "type": "private",
                    "first_name": "Test",
                },
                "text": "choose",
            },
        });

        serde_json::from_value(json).expect("failed to deserialize mock callback query")
    }

    #[test]
    fn text_message_becomes_text_event() {
        let msg = make_text_message(12345, Some("testuser"), "hello");
        let event = message_to_event(&msg).unwrap();

        assert_eq!(event.sender.user_id, 12345);
        assert_eq!(event.sender.username.as_deref(), Some("testuser"));
        assert_eq!(event.chat_id, 12345);
        assert_eq!(event.payload, EventPayload::Text("hello".to_string()));
    }

    #[test]
    fn command_takes_precedence_over_text() {
        let msg = make_text_message(12345, None, "/start");
        let event = message_to_event(&msg).unwrap();
        assert_eq!(event.payload, EventPayload::Command(Command::Start));
    }

    #[test]
    fn photo_message_keeps_largest_size() {
        let msg = make_photo_message(12345, Some("broken door"));
        let event = message_to_event(&msg).unwrap();

        match event.payload {
            EventPayload::Media {
                caption,
                attachment,
            } => {
                assert_eq!(caption, "broken door");
                assert_eq!(attachment.kind, MediaKind::Photo);
                assert_eq!(attachment.file_id, "large-file");
                assert_eq!(attachment.file_size, Some(9000));
            }
            other => panic!("expected Media payload, got {other:?}"),
        }
    }

    #[test]
    fn photo_without_caption_has_empty_caption() {
        let msg = make_photo_message(12345, None);
        let event = message_to_event(&msg).unwrap();
        match event.payload {
            EventPayload::Media { caption, .. } => assert!(caption.is_empty()),
            other => panic!("expected Media payload, got {other:?}"),
        }
    }

    #[test]
    fn document_message_keeps_name_and_mime() {
        let msg = make_document_message(12345);
        let event = message_to_event(&msg).unwrap();
        match event.payload {
            EventPayload::Media { attachment, .. } => {
                assert_eq!(attachment.kind, MediaKind::Document);
                assert_eq!(attachment.file_name.as_deref(), Some("scan.pdf"));
                assert_eq!(attachment.mime_type.as_deref(), Some("application/pdf"));
            }
            other => panic!("expected Media payload, got {other:?}"),
        }
    }

    #[test]
    fn callback_query_becomes_button_event() {
        let query = make_callback_query(12345, "complaint");
        let event = callback_to_event(&query).unwrap();

        assert_eq!(event.sender.user_id, 12345);
        assert_eq!(event.chat_id, 12345);
        assert_eq!(event.payload, EventPayload::Button(ButtonAction::Complaint));
    }

    #[test]
    fn callback_query_with_unknown_data_is_dropped() {
        let query = make_callback_query(12345, "not-a-button");
        assert!(callback_to_event(&query).is_none());
    }

    #[test]
    fn submitter_fields_copied_verbatim() {
        let msg = make_text_message(777, Some("aru"), "hi");
        let event = message_to_event(&msg).unwrap();
        assert_eq!(event.sender.first_name, "Test");
        assert_eq!(event.sender.last_name, "User");
        assert_eq!(event.sender.username.as_deref(), Some("aru"));
    }
}
