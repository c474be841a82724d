// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation state machine and submission pipeline.
//!
//! One parameterized engine drives the whole dialogue:
//! `Start -> AwaitingCategory -> AwaitingMessage -> Start`, with inline
//! category buttons short-circuiting straight to `AwaitingMessage`.
//! Commands always take precedence over state-dependent text handling.

use std::sync::Arc;
use std::time::Duration;

use carelink_config::model::CarelinkConfig;
use carelink_core::types::{
    ButtonAction, ChatEvent, Command, EventPayload, FeedbackCategory, FeedbackRecord,
    FeedbackStatus, Locale, NewFeedback, NewMediaAttachment, Reply,
};
use carelink_core::{CarelinkError, FeedbackStore, Notifier};
use chrono::{FixedOffset, Offset, Utc};
use metrics::counter;
use tracing::{debug, error, info, warn};

use crate::session::{SessionTable, Stage, UserSession};
use crate::texts::Texts;

/// Behavior switches for the dialogue engine.
///
/// The historical feature variants (plain text vs. inline buttons vs.
/// localized text vs. attachments) collapse into this one configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub locale: Locale,
    pub inline_buttons: bool,
    pub accept_media: bool,
    pub admin_user_id: Option<i64>,
    pub utc_offset_hours: i8,
    pub op_timeout: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &CarelinkConfig) -> Self {
        Self {
            locale: config.bot.locale,
            inline_buttons: config.bot.inline_buttons,
            accept_media: config.bot.accept_media,
            admin_user_id: config.bot.admin_user_id,
            utc_offset_hours: config.bot.utc_offset_hours,
            op_timeout: Duration::from_secs(config.storage.op_timeout_secs),
        }
    }
}

/// The per-user dialogue engine.
///
/// Holds the session table and routes every inbound event under that
/// user's session lock, so concurrent events from one user serialize.
pub struct DialogueEngine {
    store: Arc<dyn FeedbackStore>,
    notifier: Option<Arc<dyn Notifier>>,
    sessions: Arc<SessionTable>,
    texts: Texts,
    options: EngineOptions,
    tz: FixedOffset,
}

impl DialogueEngine {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        notifier: Option<Arc<dyn Notifier>>,
        options: EngineOptions,
    ) -> Self {
        // The configured offset is validated to a sane range at startup.
        let tz = FixedOffset::east_opt(i32::from(options.utc_offset_hours) * 3600)
            .unwrap_or_else(|| Utc.fix());
        Self {
            store,
            notifier,
            sessions: Arc::new(SessionTable::new()),
            texts: Texts::new(options.locale),
            options,
            tz,
        }
    }

    /// The session table, shared with the idle-eviction sweeper.
    pub fn sessions(&self) -> Arc<SessionTable> {
        self.sessions.clone()
    }

    /// Routes one inbound event and returns the replies to render.
    ///
    /// The user's session lock is held for the whole transition, including
    /// the store write of a submission.
    pub async fn handle_event(&self, event: ChatEvent) -> Vec<Reply> {
        counter!("carelink_events_total").increment(1);

        let session = self.sessions.session(event.sender.user_id);
        let mut session = session.lock().await;
        session.last_seen = Utc::now();

        match event.payload.clone() {
            EventPayload::Command(command) => {
                self.handle_command(&command, &event, &mut session).await
            }
            EventPayload::Button(action) => {
                self.handle_button(action, &event, &mut session).await
            }
            EventPayload::Text(text) => self.handle_text(&text, &event, &mut session).await,
            EventPayload::Media {
                caption,
                attachment,
            } => {
                if session.stage == Stage::AwaitingMessage {
                    let attachment = self.options.accept_media.then_some(attachment);
                    self.submit(&event, &mut session, caption, attachment).await
                } else {
                    // Outside the submission step the attachment is
                    // irrelevant; route the caption like plain text.
                    self.handle_text(&caption, &event, &mut session).await
                }
            }
        }
    }

    /// Commands work in any state.
    async fn handle_command(
        &self,
        command: &Command,
        event: &ChatEvent,
        session: &mut UserSession,
    ) -> Vec<Reply> {
        match command {
            Command::Start => self.begin_dialogue(event, session),
            Command::Help => vec![self.reply_with_back(event, self.texts.help())],
            Command::Menu => {
                vec![self.reply(event, self.texts.main_menu(), self.texts.category_keyboard())]
            }
            Command::Stats => self.handle_stats(event).await,
            Command::Unknown(name) => {
                debug!(command = name.as_str(), "unknown command");
                vec![Reply::text(event.chat_id, self.texts.unknown_command())]
            }
        }
    }

    /// Category buttons short-circuit `AwaitingCategory`; menu buttons
    /// leave the state unchanged.
    async fn handle_button(
        &self,
        action: ButtonAction,
        event: &ChatEvent,
        session: &mut UserSession,
    ) -> Vec<Reply> {
        match action {
            ButtonAction::Complaint => {
                vec![self.select_category(FeedbackCategory::Complaint, event, session)]
            }
            ButtonAction::Review => {
                vec![self.select_category(FeedbackCategory::Review, event, session)]
            }
            ButtonAction::Help => vec![self.reply_with_back(event, self.texts.help())],
            ButtonAction::MainMenu => {
                vec![self.reply(event, self.texts.main_menu(), self.texts.category_keyboard())]
            }
        }
    }

    /// State-dependent free-text handling.
    async fn handle_text(
        &self,
        text: &str,
        event: &ChatEvent,
        session: &mut UserSession,
    ) -> Vec<Reply> {
        match session.stage {
            // Any text at the top level is an implicit /start.
            Stage::Start => self.begin_dialogue(event, session),
            Stage::AwaitingCategory => match self.texts.match_category(text) {
                Some(category) => vec![self.select_category(category, event, session)],
                None => vec![self.reply(
                    event,
                    self.texts.category_guidance(),
                    self.texts.category_keyboard(),
                )],
            },
            Stage::AwaitingMessage => {
                self.submit(event, session, text.to_string(), None).await
            }
        }
    }

    /// Clears scratch data and renders the category prompt.
    fn begin_dialogue(&self, event: &ChatEvent, session: &mut UserSession) -> Vec<Reply> {
        session.pending_category = None;
        session.stage = Stage::AwaitingCategory;
        vec![self.reply(event, self.texts.welcome(), self.texts.category_keyboard())]
    }

    /// Records the chosen category and renders the describe-prompt.
    fn select_category(
        &self,
        category: FeedbackCategory,
        event: &ChatEvent,
        session: &mut UserSession,
    ) -> Reply {
        session.pending_category = Some(category);
        session.stage = Stage::AwaitingMessage;
        Reply::text(event.chat_id, self.texts.describe_prompt(category))
    }

    /// Admin check happens before any store query; a denied request never
    /// touches the store.
    async fn handle_stats(&self, event: &ChatEvent) -> Vec<Reply> {
        let is_admin = self
            .options
            .admin_user_id
            .is_some_and(|admin| admin == event.sender.user_id);
        if !is_admin {
            info!(user_id = event.sender.user_id, "stats denied");
            return vec![Reply::text(event.chat_id, self.texts.stats_denied())];
        }

        match tokio::time::timeout(self.options.op_timeout, self.store.counts_by_category()).await
        {
            Ok(Ok(counts)) => {
                vec![self.reply_with_back(event, self.texts.stats(&counts))]
            }
            Ok(Err(e)) => {
                error!(error = %e, "failed to fetch stats");
                vec![Reply::text(event.chat_id, self.texts.stats_failed())]
            }
            Err(_) => {
                error!("stats query timed out");
                vec![Reply::text(event.chat_id, self.texts.stats_failed())]
            }
        }
    }

    /// The submission pipeline: persist, then notify best-effort.
    ///
    /// The session resets to `Start` whatever the outcome -- a failed
    /// attempt is dropped, never silently retried, and stale scratch data
    /// cannot leak into the next attempt.
    async fn submit(
        &self,
        event: &ChatEvent,
        session: &mut UserSession,
        message: String,
        attachment: Option<NewMediaAttachment>,
    ) -> Vec<Reply> {
        let Some(category) = session.pending_category else {
            // Unreachable through normal transitions; recover by
            // restarting the dialogue.
            warn!(user_id = event.sender.user_id, "no pending category at submission");
            return self.begin_dialogue(event, session);
        };

        let feedback = NewFeedback {
            submitter: event.sender.clone(),
            message,
            category,
            created_at: Utc::now().with_timezone(&self.tz),
            attachments: attachment.into_iter().collect(),
        };

        let saved = match tokio::time::timeout(
            self.options.op_timeout,
            self.store.save_feedback(&feedback),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CarelinkError::Timeout {
                duration: self.options.op_timeout,
            }),
        };

        session.reset();

        let record = match saved {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, user_id = event.sender.user_id, "failed to save feedback");
                counter!("carelink_save_failures_total").increment(1);
                return vec![Reply::text(event.chat_id, self.texts.save_failed())];
            }
        };

        info!(
            feedback_id = record.id,
            category = %record.category,
            attachments = record.attachments.len(),
            "feedback saved"
        );
        counter!("carelink_feedback_saved_total").increment(1);

        let attachment_count = record.attachments.len();
        self.spawn_notify(record);

        vec![self.reply(
            event,
            self.texts.confirmation(category, attachment_count),
            self.texts.post_submit_keyboard(),
        )]
    }

    /// Best-effort notification as an explicit background task.
    ///
    /// The record is marked `sent` only when the notifier reports success;
    /// on failure it stays `new` so `list_new` re-surfaces it. The
    /// already-committed store write is never rolled back.
    fn spawn_notify(&self, record: FeedbackRecord) {
        let Some(notifier) = self.notifier.clone() else {
            debug!(feedback_id = record.id, "notifier disabled, record stays new");
            return;
        };
        let store = self.store.clone();

        tokio::spawn(async move {
            match notifier.notify(&record).await {
                Ok(()) => {
                    if let Err(e) = store.update_status(record.id, FeedbackStatus::Sent).await {
                        warn!(
                            error = %e,
                            feedback_id = record.id,
                            "notified but failed to mark record sent"
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        feedback_id = record.id,
                        "notification failed, record stays new"
                    );
                    counter!("carelink_notify_failures_total").increment(1);
                }
            }
        });
    }

    fn reply(
        &self,
        event: &ChatEvent,
        text: impl Into<String>,
        keyboard: carelink_core::types::Keyboard,
    ) -> Reply {
        if self.options.inline_buttons {
            Reply::with_keyboard(event.chat_id, text, keyboard)
        } else {
            Reply::text(event.chat_id, text)
        }
    }

    fn reply_with_back(&self, event: &ChatEvent, text: impl Into<String>) -> Reply {
        self.reply(event, text, self.texts.back_keyboard())
    }
}
