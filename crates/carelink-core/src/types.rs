// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the Carelink workspace.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for an outbound chat message, as assigned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`ServiceAdapter`](crate::traits::ServiceAdapter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterKind {
    Channel,
    Storage,
    Notifier,
}

/// Locale of the user-facing dialogue texts and category synonyms.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

/// Closed classification of a feedback record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    Complaint,
    Review,
}

/// Processing status of a stored feedback record.
///
/// `New` means persisted but delivery unconfirmed; `Sent` is set only after
/// the notifier reports success. `Processed` is reserved for staff workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    New,
    Processed,
    Sent,
}

/// Kind of a media attachment, mirroring the transport's message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Audio,
}

/// Identity of the user who submitted an event, copied verbatim from the
/// inbound message. None of these fields are validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitter {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
}

impl Submitter {
    /// "First Last" with empty parts elided.
    pub fn display_name(&self) -> String {
        let mut name = self.first_name.clone();
        if !self.last_name.is_empty() {
            if !name.is_empty() {
                name.push(' ');
            }
            name.push_str(&self.last_name);
        }
        name
    }
}

/// A media attachment awaiting insertion. Only the transport file reference
/// and its metadata are kept; raw bytes are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMediaAttachment {
    pub kind: MediaKind,
    pub file_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

/// A stored media attachment row, owned by its feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub id: i64,
    pub feedback_id: i64,
    pub kind: MediaKind,
    pub file_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

/// A feedback record assembled by the dialogue engine, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub submitter: Submitter,
    /// Free-text body; may be empty when only an attachment was sent.
    pub message: String,
    pub category: FeedbackCategory,
    /// Creation time in the submitter's civil time (configured fixed offset).
    pub created_at: DateTime<FixedOffset>,
    pub attachments: Vec<NewMediaAttachment>,
}

/// A persisted feedback record with its store-assigned identity and
/// eagerly-loaded attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub submitter: Submitter,
    pub message: String,
    pub category: FeedbackCategory,
    pub status: FeedbackStatus,
    /// RFC 3339 timestamp as stored.
    pub created_at: String,
    pub attachments: Vec<MediaAttachment>,
}

/// A slash command recognized by the dialogue engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Menu,
    Stats,
    Unknown(String),
}

impl Command {
    /// Parses the leading `/command` token of a message, ignoring any
    /// `@botname` suffix. Returns `None` when the text is not a command.
    pub fn parse(text: &str) -> Option<Command> {
        let trimmed = text.trim();
        let rest = trimmed.strip_prefix('/')?;
        let token = rest.split_whitespace().next().unwrap_or_default();
        let name = token.split('@').next().unwrap_or_default();
        Some(match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "menu" => Command::Menu,
            "stats" => Command::Stats,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// Action encoded in an inline button's callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Complaint,
    Review,
    Help,
    MainMenu,
}

impl ButtonAction {
    /// Wire value carried in the callback payload.
    pub fn callback_data(self) -> &'static str {
        match self {
            ButtonAction::Complaint => "complaint",
            ButtonAction::Review => "review",
            ButtonAction::Help => "help",
            ButtonAction::MainMenu => "main_menu",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<ButtonAction> {
        Some(match data {
            "complaint" => ButtonAction::Complaint,
            "review" => ButtonAction::Review,
            "help" => ButtonAction::Help,
            "main_menu" => ButtonAction::MainMenu,
            _ => return None,
        })
    }

    /// The category this button selects, if it is a category button.
    pub fn category(self) -> Option<FeedbackCategory> {
        match self {
            ButtonAction::Complaint => Some(FeedbackCategory::Complaint),
            ButtonAction::Review => Some(FeedbackCategory::Review),
            _ => None,
        }
    }
}

/// Payload of an inbound chat event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// A slash command.
    Command(Command),
    /// Plain free text.
    Text(String),
    /// A message carrying a media attachment, with its caption (possibly empty).
    Media {
        caption: String,
        attachment: NewMediaAttachment,
    },
    /// An inline button press.
    Button(ButtonAction),
}

/// One inbound event from the chat gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent {
    pub sender: Submitter,
    /// Destination for replies to this event.
    pub chat_id: i64,
    pub payload: EventPayload,
}

/// A single inline button: user-visible label plus its callback action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

/// An inline keyboard, one button per row (the transport renders rows).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<InlineButton>,
}

impl Keyboard {
    pub fn new(rows: Vec<InlineButton>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An outbound message produced by the dialogue engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(chat_id: i64, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_round_trips_through_strings() {
        assert_eq!(FeedbackCategory::Complaint.to_string(), "complaint");
        assert_eq!(
            FeedbackCategory::from_str("review").unwrap(),
            FeedbackCategory::Review
        );
        assert!(FeedbackCategory::from_str("praise").is_err());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            FeedbackStatus::New,
            FeedbackStatus::Processed,
            FeedbackStatus::Sent,
        ] {
            let parsed = FeedbackStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn command_parse_recognizes_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/menu"), Some(Command::Menu));
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
    }

    #[test]
    fn command_parse_strips_bot_mention() {
        assert_eq!(Command::parse("/start@carelink_bot"), Some(Command::Start));
    }

    #[test]
    fn command_parse_unknown_keeps_name() {
        assert_eq!(
            Command::parse("/export csv"),
            Some(Command::Unknown("export".to_string()))
        );
    }

    #[test]
    fn command_parse_rejects_plain_text() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn button_action_callback_round_trip() {
        for action in [
            ButtonAction::Complaint,
            ButtonAction::Review,
            ButtonAction::Help,
            ButtonAction::MainMenu,
        ] {
            let data = action.callback_data();
            assert_eq!(ButtonAction::from_callback_data(data), Some(action));
        }
        assert_eq!(ButtonAction::from_callback_data("unknown"), None);
    }

    #[test]
    fn button_category_only_for_category_buttons() {
        assert_eq!(
            ButtonAction::Complaint.category(),
            Some(FeedbackCategory::Complaint)
        );
        assert_eq!(ButtonAction::Review.category(), Some(FeedbackCategory::Review));
        assert_eq!(ButtonAction::Help.category(), None);
        assert_eq!(ButtonAction::MainMenu.category(), None);
    }

    #[test]
    fn submitter_display_name_elides_empty_parts() {
        let full = Submitter {
            user_id: 1,
            first_name: "Aru".into(),
            last_name: "Seitkali".into(),
            username: None,
        };
        assert_eq!(full.display_name(), "Aru Seitkali");

        let first_only = Submitter {
            first_name: "Aru".into(),
            ..Default::default()
        };
        assert_eq!(first_only.display_name(), "Aru");
    }
}
